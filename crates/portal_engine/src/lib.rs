pub mod cart;
pub mod catalog;
pub mod charts;
pub mod chat;
pub mod dashboard;
pub mod directory;
pub mod engagement;
pub mod forms;
pub mod poller;
pub mod state;

pub use cart::{
    checkout, checkout_session_request, Cart, CartSession, CartStore, CheckoutError,
    FileCartStore, InMemoryCartStore, Receipt,
};
pub use catalog::{display_image, placeholder_image, Catalog};
pub use charts::{Chart, ChartId, ChartKind, ChartRegistry};
pub use chat::ChatReply;
pub use dashboard::{Dashboard, DashboardLoader, DashboardOptions, DashboardView, Section};
pub use directory::{AnswerView, DirectoryState, Download, NavError};
pub use forms::{FormError, OfficerForm, ProfileForm, ServiceForm};
pub use poller::{JobPoller, PollError, PollHandle, PollSettings};
pub use state::AppState;
