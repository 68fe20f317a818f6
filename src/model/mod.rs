pub mod actor;
pub mod work_item;
