pub mod model;
pub mod repository;

pub use model::EdgeServer;
pub use repository::EdgeServerRepository;
