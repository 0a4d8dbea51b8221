//! Smoking exposure (pack-years).
//!
//! This is the only derivation in the record. Both the wizard preview and
//! the save path go through [`pack_years`].

use super::sections::Tabagismo;
use super::vocab::StatusTabagismo;

/// Packs per day times years smoked.
pub fn pack_years(macos_dia: f64, anos: i64) -> f64 {
    macos_dia * anos as f64
}

impl Tabagismo {
    /// Pack-years for the current inputs, regardless of status
    pub fn pack_years(&self) -> f64 {
        pack_years(self.macos_dia, self.anos)
    }

    /// Whether the pack-years figure is clinically meaningful
    pub fn has_exposure(&self) -> bool {
        self.status != StatusTabagismo::Nunca && self.pack_years() > 0.0
    }

    /// Preview text, e.g. `15.0 pack-years`, or `None` when there is no exposure
    pub fn pack_years_display(&self) -> Option<String> {
        self.has_exposure()
            .then(|| format!("{:.1} pack-years", self.pack_years()))
    }

    /// Overwrite the stored derived field from the inputs
    pub fn refresh_pack_years(&mut self) {
        self.carga_tabagica_packyears = self.pack_years();
    }
}
