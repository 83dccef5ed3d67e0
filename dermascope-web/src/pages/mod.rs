mod admin;
mod dashboard;
mod history;
mod home;
mod login;
mod result;
mod signup;
mod upload;

pub use admin::AdminPage;
pub use dashboard::DashboardPage;
pub use history::HistoryPage;
pub use home::{HomePage, NotFound};
pub use login::LoginPage;
pub use result::ResultPage;
pub use signup::SignupPage;
pub use upload::UploadPage;
