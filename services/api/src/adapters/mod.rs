pub mod db;
pub mod model;

pub use db::DbAdapter;
pub use model::ForestClassifier;
