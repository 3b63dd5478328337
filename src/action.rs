use crate::api::types::{Category, Item};
use crate::dispatch::Location;

/// All possible actions in the application (TEA pattern).
#[derive(Debug)]
pub enum Action {
    Tick,
    Render,
    Quit,
    NavigateUp,
    NavigateDown,
    ShowHelp,

    // Backend actions
    PollNow,
    GenerateBriefing,
    OpenCategoryPicker,
    Reclassified { item_id: String, category: String },

    // Category picker
    PickerUp,
    PickerDown,
    PickerSubmit,

    // Briefing view
    Navigate(Location),
    Reload,
    CycleFilter,
    ItemsLoaded {
        briefing_id: String,
        filter: Option<String>,
        items: Vec<Item>,
    },
    ItemsFailed {
        briefing_id: String,
        filter: Option<String>,
        error: String,
    },
    CategoriesLoaded(Vec<Category>),
}
