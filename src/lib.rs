//! Workspace tooling package. It carries the git hooks configured in the
//! root manifest; the libraries and the CLI live under `crates/`.
