//! Endpoint-specific API implementations
//!
//! | Module | REST path | Description |
//! |--------|-----------|-------------|
//! | `runs` | `actions/runs`, `actions/runs/{id}` | Workflow run listing and status |
//! | `artifacts` | `actions/runs/{id}/artifacts` | Artifacts attached to a run |

pub mod artifacts;
pub mod runs;

pub use artifacts::ArtifactsApi;
pub use runs::RunsApi;
