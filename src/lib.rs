//! # backoffice-gateway
//!
//! REST API and WebSocket gateway for a financial back-office console.
//!
//! The gateway fetches record collections (deposits, withdrawals,
//! investment settlements, referrals, transactions, news posts) from the
//! platform API, normalizes every backend shape into one [`domain::Record`],
//! and serves filtered, sorted views with summary statistics. Status
//! transitions are forwarded to the backend, which stays the single source
//! of truth; the gateway holds no record state.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── RecordService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── normalize / filter / stats (domain/)
//!     │
//!     └── RecordBackend (backend/): HTTP platform API or in-memory fixture
//! ```

pub mod api;
pub mod app_state;
pub mod backend;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;
