pub mod preferences;

pub use preferences::default_preferences_path;
pub use preferences::PreferenceStore;
