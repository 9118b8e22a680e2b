//! Layout-wide sidebar state.
//!
//! Created when the dashboard layout mounts and passed explicitly to the
//! views that read or update it. Zone data is cleared whenever
//! navigation leaves a zone view.

use ward_map_records_models::Ward;

#[derive(Debug, Clone, PartialEq)]
pub struct SidebarContext {
    pub sidebar_open: bool,
    pub current_zone_no: Option<String>,
    pub current_zone_wards: Vec<Ward>,
    pub is_loading_wards: bool,
}

impl Default for SidebarContext {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            current_zone_no: None,
            current_zone_wards: Vec::new(),
            is_loading_wards: false,
        }
    }
}

impl SidebarContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the sidebar. Returns the new state.
    pub const fn toggle(&mut self) -> bool {
        self.sidebar_open = !self.sidebar_open;
        self.sidebar_open
    }

    pub const fn open(&mut self) {
        self.sidebar_open = true;
    }

    pub const fn close(&mut self) {
        self.sidebar_open = false;
    }

    /// Marks the wards of `zone_no` as loading, dropping any previous
    /// zone's list.
    pub fn begin_loading_wards(&mut self, zone_no: &str) {
        self.current_zone_no = Some(zone_no.to_string());
        self.current_zone_wards.clear();
        self.is_loading_wards = true;
    }

    /// Stores the wards of `zone_no`, ending the loading state.
    pub fn set_zone_wards(&mut self, zone_no: &str, wards: Vec<Ward>) {
        self.current_zone_no = Some(zone_no.to_string());
        self.current_zone_wards = wards;
        self.is_loading_wards = false;
    }

    pub fn clear_ward_data(&mut self) {
        self.current_zone_no = None;
        self.current_zone_wards.clear();
        self.is_loading_wards = false;
    }
}
