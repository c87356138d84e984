use crate::widgets::SectionParam;

/// What changed, so a front end can refresh exactly the affected widgets.
///
/// `Rebuild` follows a whole-state replace and means every widget must be
/// recreated from state; all other variants are narrow.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ViewUpdate {
    Rebuild,
    ModelColor,
    ModelVisible,
    ModelOpacity,
    SectionVisible,
    SectionClipping,
    SectionParam(SectionParam),
    DomainSurfacesVisible,
    DomainSectionsVisible,
    /// Colour or visibility of one domain (by index).
    Domain(usize),
    /// A domain category list was opened or closed.
    CategoryOpen(usize),
    GuiVisible,
    HelpVisible,
    /// The colour swatch was shown or hidden.
    Swatch,
}

impl ViewUpdate {
    pub fn is_full_rebuild(self) -> bool {
        matches!(self, ViewUpdate::Rebuild)
    }
}
