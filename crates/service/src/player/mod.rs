//! Player persistence: domain record, repository contract and its two backends.
//!
//! Exactly one backend is selected at startup and shared as
//! `Arc<dyn PlayerRepository>` for the process lifetime.

pub mod cached;
pub mod domain;
pub mod errors;
pub mod memory;
pub mod repository;
pub mod service;
pub mod store;

pub use cached::{cache_key, CachedPlayerRepository, PLAYER_CACHE_TTL};
pub use domain::{money, Player, PlayerId, PlayerView};
pub use errors::RepositoryError;
pub use memory::MemoryPlayerRepository;
pub use repository::PlayerRepository;
pub use service::PlayerService;
pub use store::{PlayerStore, SeaOrmPlayerStore};
