pub mod color;
pub mod confirm_delete;
pub mod editor;
pub mod filters_box;
pub mod form;
pub mod help;
pub mod item_view;
pub mod status_bar;
pub mod tabs;
pub mod task_list;
