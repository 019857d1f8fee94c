pub mod credential;
pub mod error;
pub mod lookup;
pub mod provider;
pub mod updater;

pub use credential::CredentialManager;
pub use error::InventoryError;
pub use lookup::{InventoryClient, InventoryCounts};
pub use provider::{CommandProvider, CredentialProvider};
pub use updater::{update_quantities, UpdateReport};
