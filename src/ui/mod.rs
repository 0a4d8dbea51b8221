pub mod dashboard;
pub mod detail;
pub mod dialogs;
pub mod form_field;
pub mod login;
pub mod terminal_guard;
pub mod toast;
pub mod wizard;

pub use dashboard::Dashboard;
pub use detail::DetailView;
pub use login::LoginScreen;
pub use wizard::WizardScreen;
