pub mod parsing;
pub mod profile;
pub mod quota;
pub mod recommendations;
pub mod store;
pub mod strategies;

pub use recommendations::RecommendationService;
pub use store::MovieStore;
