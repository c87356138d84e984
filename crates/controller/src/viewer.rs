use foundation::color::{hex_from_rgb, hex_to_u32};
use formats::{
    DocumentError, ParamError, QueryParams, apply_url_params, build_share_url, parse_state,
    save_state,
};
use render::{RenderBridge, Renderer};
use runtime::{EventBus, History};
use scene::{ApplicationState, CategoryIndex};
use tracing::{debug, warn};

use crate::error::ViewerError;
use crate::store::{Snapshot, StateStore};
use crate::updates::ViewUpdate;
use crate::widgets::{ClipMode, ListState, SectionParam, SwatchTarget};

/// `tracing::debug!` only when the loaded state asks for diagnostics.
macro_rules! diag {
    ($viewer:expr, $($arg:tt)+) => {
        if $viewer.store.get().debug {
            debug!($($arg)+);
        }
    };
}

/// Where the page was loaded from. Needed to rebuild share URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerLocation {
    pub base_url: String,
    pub config_path: String,
}

impl ViewerLocation {
    /// Reads the page base URL and the required `config` parameter.
    pub fn from_params(params: &QueryParams) -> Result<Self, ViewerError> {
        let config_path = params.get("config").ok_or(ViewerError::MissingConfig)?;
        Ok(Self {
            base_url: params.base_url().to_string(),
            config_path: config_path.to_string(),
        })
    }
}

/// GUI state that lives outside the application state and is never saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuiState {
    pub show_gui: bool,
    pub help_visible: bool,
    pub swatch: Option<SwatchTarget>,
}

impl Default for GuiState {
    fn default() -> Self {
        Self {
            show_gui: true,
            help_visible: false,
            swatch: None,
        }
    }
}

/// Parses a `background` parameter: decimal, or hex with a `0x` prefix.
pub fn parse_clear_color(value: &str) -> Option<u32> {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

/// The application context: owns the live state, the undo/redo history,
/// the renderer and the GUI state, and is the only thing that mutates
/// any of them.
///
/// Every user action is a method here. Each method mutates the state,
/// pushes the matching renderer updates through [`RenderBridge`] and
/// records a [`ViewUpdate`] so the GUI can refresh. Only whole-state
/// replacement (undo, redo, load) produces [`ViewUpdate::Rebuild`].
pub struct Viewer<R: Renderer> {
    store: StateStore,
    history: History<Snapshot>,
    updates: EventBus<ViewUpdate>,
    bridge: RenderBridge,
    renderer: R,
    location: ViewerLocation,
    gui: GuiState,
    categories: CategoryIndex,
}

impl<R: Renderer> Viewer<R> {
    /// Builds the viewer from the fetched configuration and the page's URL
    /// parameters, then draws the initial scene.
    ///
    /// A malformed URL parameter does not stop startup: parameters decoded
    /// before it stay applied and the error is handed back for reporting.
    pub fn start(
        mut renderer: R,
        params: &QueryParams,
        location: ViewerLocation,
        config: ApplicationState,
    ) -> (Self, Option<ParamError>) {
        let mut state = config;
        let param_error = apply_url_params(&mut state, params).err();
        if let Some(err) = &param_error {
            warn!(%err, "ignoring remaining url parameters");
        }

        if let Some(bg) = params.get("background") {
            match parse_clear_color(bg) {
                Some(color) => renderer.set_clear_color(color),
                None => warn!(background = bg, "invalid background colour"),
            }
        }

        let store = StateStore::new(state);
        let categories = CategoryIndex::build(store.get());
        let mut viewer = Self {
            store,
            history: History::new(),
            updates: EventBus::new(),
            bridge: RenderBridge::new(),
            renderer,
            location,
            gui: GuiState::default(),
            categories,
        };
        diag!(viewer, config = %viewer.location.config_path, "starting viewer");
        viewer.rebuild();
        (viewer, param_error)
    }

    pub fn state(&self) -> &ApplicationState {
        self.store.get()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// For front ends that need to drive the renderer directly, e.g. on
    /// canvas resize.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn history(&self) -> &History<Snapshot> {
        &self.history
    }

    pub fn gui(&self) -> &GuiState {
        &self.gui
    }

    pub fn categories(&self) -> &CategoryIndex {
        &self.categories
    }

    pub fn location(&self) -> &ViewerLocation {
        &self.location
    }

    /// Takes the widget refreshes recorded since the last call.
    pub fn drain_updates(&mut self) -> Vec<ViewUpdate> {
        self.updates.drain_payloads()
    }

    fn rebuild(&mut self) {
        self.categories = CategoryIndex::build(self.store.get());
        self.gui.swatch = None;
        self.bridge.rebuild(self.store.get(), &mut self.renderer);
        self.updates.emit(ViewUpdate::Rebuild);
    }

    /// Replaces the whole state with an independent copy of `new`, then
    /// rebuilds the scene and every widget.
    pub fn replace_state(&mut self, new: &ApplicationState) {
        self.store.replace(new);
        diag!(self, "state replaced");
        self.rebuild();
    }

    /// Saves a copy of the current state for undo.
    pub fn push_undo(&mut self) {
        self.history.push_undo(self.store.snapshot());
    }

    /// Returns whether a state was restored. The current state is pushed
    /// for redo either way.
    pub fn undo(&mut self) -> bool {
        self.history.push_redo(self.store.snapshot());
        match self.history.pop_undo() {
            Some(prev) => {
                self.replace_state(prev.state());
                true
            }
            None => {
                diag!(self, "nothing to undo");
                false
            }
        }
    }

    /// Returns whether a state was restored. The current state is pushed
    /// for undo either way.
    pub fn redo(&mut self) -> bool {
        self.history.push_undo(self.store.snapshot());
        match self.history.pop_redo() {
            Some(next) => {
                self.replace_state(next.state());
                true
            }
            None => {
                diag!(self, "nothing to redo");
                false
            }
        }
    }

    pub fn set_model_visible(&mut self, visible: bool) {
        diag!(self, visible, "model visibility");
        self.store.get_mut().model_visible = visible;
        self.bridge.update_model(self.store.get(), &mut self.renderer);
        self.updates.emit(ViewUpdate::ModelVisible);
    }

    pub fn toggle_model_visible(&mut self) -> bool {
        let visible = !self.store.get().model_visible;
        self.set_model_visible(visible);
        visible
    }

    /// Clamps to `0..=1`.
    pub fn set_model_opacity(&mut self, opacity: f64) -> f64 {
        let opacity = opacity.clamp(0.0, 1.0);
        self.store.get_mut().model.opacity = opacity;
        self.bridge.update_model(self.store.get(), &mut self.renderer);
        self.updates.emit(ViewUpdate::ModelOpacity);
        opacity
    }

    /// Does nothing unless sectioning is on.
    pub fn set_section_visible(&mut self, visible: bool) {
        let Some(sec) = self.store.get_mut().active_section_mut() else {
            return;
        };
        sec.visible = visible;
        diag!(self, visible, "section visibility");
        self.bridge.update_section(self.store.get(), &mut self.renderer);
        self.updates.emit(ViewUpdate::SectionVisible);
    }

    pub fn toggle_section_visible(&mut self) -> Option<bool> {
        let visible = !self.store.get().active_section()?.visible;
        self.set_section_visible(visible);
        Some(visible)
    }

    /// Advances Off -> Clip -> ClipFlipped -> Off. Returns `None` and
    /// changes nothing unless sectioning is on.
    pub fn cycle_section_clipping(&mut self) -> Option<ClipMode> {
        let sec = self.store.get_mut().active_section_mut()?;
        let mode = ClipMode::of(sec).next();
        mode.apply(sec);
        diag!(self, ?mode, "section clipping");
        self.bridge.update_section(self.store.get(), &mut self.renderer);
        self.updates.emit(ViewUpdate::SectionClipping);
        Some(mode)
    }

    /// Sets a section slider value. Returns the value stored, which can
    /// differ from `value` for the grey-level window bounds.
    pub fn set_section_param(&mut self, param: SectionParam, value: f64) -> Option<f64> {
        let sec = self.store.get_mut().active_section_mut()?;
        let stored = param.set(sec, value);
        diag!(self, %param, value, stored, "section parameter");
        self.bridge.update_section(self.store.get(), &mut self.renderer);
        self.updates.emit(ViewUpdate::SectionParam(param));
        Some(stored)
    }

    pub fn set_domain_surfaces_visible(&mut self, visible: bool) {
        self.store.get_mut().domain_surfaces_visible = visible;
        self.bridge
            .update_all_domains(self.store.get(), &mut self.renderer);
        self.updates.emit(ViewUpdate::DomainSurfacesVisible);
    }

    pub fn set_domain_sections_visible(&mut self, visible: bool) {
        self.store.get_mut().domain_sections_visible = visible;
        self.bridge.update_section(self.store.get(), &mut self.renderer);
        self.updates.emit(ViewUpdate::DomainSectionsVisible);
    }

    /// Returns `false` for an unknown domain index.
    pub fn set_domain_visible(&mut self, index: usize, visible: bool) -> bool {
        let Some(dom) = self.store.get_mut().model.domains.get_mut(index) else {
            warn!(index, "no such domain");
            return false;
        };
        dom.visible = visible;
        diag!(self, index, visible, "domain visibility");
        self.bridge
            .set_domain(self.store.get(), &mut self.renderer, index);
        self.updates.emit(ViewUpdate::Domain(index));
        true
    }

    pub fn toggle_domain_visible(&mut self, index: usize) -> Option<bool> {
        let visible = !self.store.get().model.domains.get(index)?.visible;
        self.set_domain_visible(index, visible);
        Some(visible)
    }

    pub fn category_list(&self, category: usize) -> Option<ListState> {
        let sel = self.store.get().domain_selectors.get(category)?;
        Some(ListState::from_open(sel.visible))
    }

    /// Opens or closes a category list. Returns the new list state.
    pub fn toggle_category_open(&mut self, category: usize) -> Option<ListState> {
        let sel = self.store.get_mut().domain_selectors.get_mut(category)?;
        sel.visible = !sel.visible;
        let list = ListState::from_open(sel.visible);
        self.updates.emit(ViewUpdate::CategoryOpen(category));
        Some(list)
    }

    /// Restores the home view. Undoable.
    pub fn go_home(&mut self) {
        self.push_undo();
        self.bridge.go_home(self.store.get(), &mut self.renderer);
    }

    /// Makes the renderer's current view the new home view. Undoable.
    pub fn set_home(&mut self) {
        self.push_undo();
        let view = self.renderer.current_view();
        diag!(self, ?view, "set home");
        self.store.get_mut().model.camera_home = view;
        self.renderer.set_home(view.position(), view.up());
    }

    /// Shows the colour swatch for `target`.
    pub fn begin_color_pick(&mut self, target: SwatchTarget) {
        self.gui.swatch = Some(target);
        self.updates.emit(ViewUpdate::Swatch);
    }

    /// The colour the swatch should start from.
    pub fn color_of(&self, target: SwatchTarget) -> Option<&str> {
        let state = self.store.get();
        match target {
            SwatchTarget::Model => Some(state.model.color.as_str()),
            SwatchTarget::Domain(i) => state.model.domains.get(i).map(|d| d.color.as_str()),
        }
    }

    /// Hides the swatch and, when a colour was picked, applies it to the
    /// swatch target. Applying a colour is undoable.
    pub fn finish_color_pick(&mut self, picked: Option<[u8; 3]>) {
        let Some(target) = self.gui.swatch.take() else {
            return;
        };
        self.updates.emit(ViewUpdate::Swatch);
        let Some(rgb) = picked else {
            return;
        };
        let color = hex_from_rgb(rgb);
        diag!(self, ?target, %color, "colour picked");
        match target {
            SwatchTarget::Model => {
                self.push_undo();
                self.store.get_mut().model.color = color;
                self.bridge.update_model(self.store.get(), &mut self.renderer);
                self.updates.emit(ViewUpdate::ModelColor);
            }
            SwatchTarget::Domain(index) => {
                if index >= self.store.get().model.domains.len() {
                    warn!(index, "no such domain");
                    return;
                }
                self.push_undo();
                self.store.get_mut().model.domains[index].color = color;
                self.bridge
                    .update_domain(self.store.get(), &mut self.renderer, index);
                self.updates.emit(ViewUpdate::Domain(index));
            }
        }
    }

    /// Shows or hides the whole control panel.
    pub fn toggle_gui(&mut self) -> bool {
        self.gui.show_gui = !self.gui.show_gui;
        self.updates.emit(ViewUpdate::GuiVisible);
        self.gui.show_gui
    }

    pub fn toggle_help(&mut self) -> bool {
        self.gui.help_visible = !self.gui.help_visible;
        self.updates.emit(ViewUpdate::HelpVisible);
        self.gui.help_visible
    }

    /// Share URL for the current state and the renderer's live view.
    pub fn share_url(&self) -> String {
        let url = build_share_url(
            &self.location.base_url,
            &self.location.config_path,
            self.store.get(),
            &self.renderer.current_view(),
        );
        diag!(self, %url, "share url");
        url
    }

    /// The current state as a saved-state document.
    pub fn save_state_json(&self) -> Result<String, DocumentError> {
        save_state(self.store.get())
    }

    /// Replaces the state with a saved-state document. Undoable. A document
    /// that fails to parse leaves the state and history untouched.
    pub fn load_state_json(&mut self, text: &str) -> Result<(), ViewerError> {
        let loaded = parse_state(text).map_err(ViewerError::FileLoad)?;
        self.push_undo();
        self.replace_state(&loaded);
        Ok(())
    }

    /// Current colour of the model as a packed `0xRRGGBB`.
    pub fn model_color(&self) -> u32 {
        hex_to_u32(&self.store.get().model.color)
    }
}
