pub mod chart;
pub mod controls;
pub mod debug;
pub mod sidebar;
pub mod tab_view;
pub mod table_preview;
