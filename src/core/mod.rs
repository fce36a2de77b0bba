pub mod broadcaster;
pub mod constants;
pub mod dispatcher;
pub mod switcher;
pub mod ui_state;

pub use broadcaster::*;
pub use dispatcher::*;
pub use switcher::*;
pub use ui_state::*;
