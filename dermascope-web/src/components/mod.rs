mod charts;
mod heatmap_slider;
mod history_table;
mod navbar;
mod otp_modal;
mod prediction_card;
mod upload_card;

pub use charts::{BarChart, LineChart};
pub use heatmap_slider::HeatmapSlider;
pub use history_table::HistoryTable;
pub use navbar::Navbar;
pub use otp_modal::OtpModal;
pub use prediction_card::{AnalyzeButton, PredictionCard, ProbabilityChart};
pub use upload_card::UploadCard;
