//! DOM widgets for the control panel, rebuilt from state on a full
//! replace and patched in place for every other change.

use std::fmt::Write as _;

use controller::{
    ClipMode, ListState, MODEL_OPACITY_SLIDER, SectionParam, SliderKind, SliderSpec, SwatchTarget,
    ViewUpdate, Viewer, Visibility,
};
use foundation::number::format_number;
use render::distance_range_url;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{
    CanvasRenderingContext2d, Document, Event, HtmlCanvasElement, HtmlElement, HtmlImageElement,
    HtmlInputElement, MouseEvent,
};

use crate::renderer::JsRenderer;

pub const OBJECT_PANEL: &str = "objcontrol";
const PANELS: [&str; 4] = ["statecontrol", "objcontrol", "viewcontrol", "info"];
const HELP: &str = "helptext";
const SWATCH_PANEL: &str = "swatchpanel";
const SWATCH_CANVAS: &str = "swatchcanvas";

const DEFAULT_HELP: &str = "<div class=\"aligncentre\"><u>Help Information</u></div><p></p>\
<p><div class=margin5>No application specific help has been provided, for generic help \
using this interface please visit: <br>  <a href=\"https://github.com/ma-tech\">ma-tech</a>\
</div></p>";

const HELP_CLOSE: &str = "<p></p><p></p><div class=\"aligncentre\">\
<button type=\"button\" id=\"helpclose\">Close</button></div><p></p>";

type Listener = Closure<dyn FnMut(Event)>;

pub fn document() -> Option<Document> {
    web_sys::window()?.document()
}

fn element(doc: &Document, id: &str) -> Option<HtmlElement> {
    doc.get_element_by_id(id)?.dyn_into::<HtmlElement>().ok()
}

fn set_display(doc: &Document, id: &str, display: &str) {
    if let Some(el) = element(doc, id) {
        let _ = el.style().set_property("display", display);
    }
}

fn set_src(doc: &Document, id: &str, src: &str) {
    if let Some(el) = doc.get_element_by_id(id) {
        let _ = el.set_attribute("src", src);
    }
}

fn set_background(doc: &Document, id: &str, hex: &str) {
    if let Some(el) = element(doc, id) {
        let _ = el.style().set_property("background", &format!("#{hex}"));
    }
}

fn set_input(doc: &Document, id: &str, value: f64) {
    if let Some(input) = doc
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    {
        input.set_value(&format_number(value));
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn input_value(event: &Event) -> Option<f64> {
    let input = event.target()?.dyn_into::<HtmlInputElement>().ok()?;
    let v = input.value_as_number();
    (!v.is_nan()).then_some(v)
}

fn slider_row(out: &mut String, id: &str, label: &str, spec: SliderSpec, value: f64) {
    let (lo, hi) = spec.position_range();
    let _ = write!(
        out,
        "<tr><td>{label}</td>\
         <td><input type=\"range\" id=\"{id}_range\" min=\"{}\" max=\"{}\" step=\"1\" value=\"{}\"></td>\
         <td><input type=\"number\" id=\"{id}_number\" step=\"any\" value=\"{}\"></td></tr>",
        format_number(lo),
        format_number(hi),
        format_number(spec.position_of(value)),
        format_number(value),
    );
}

fn icon_row(out: &mut String, label: &str, id: &str, title: &str, src: &str) {
    let _ = write!(
        out,
        "<tr><td colspan=\"2\">{label}</td>\
         <td width=\"33%\"><img align=\"right\" id=\"{id}\" title=\"{title}\" src=\"{src}\"></td></tr>"
    );
}

fn section_id(param: SectionParam) -> String {
    format!("sec_{}", param.id())
}

/// Section distance range and the image server URL it was fetched from.
#[derive(Debug, Default)]
struct DistanceRange {
    source: Option<String>,
    range: Option<(f64, f64)>,
}

impl DistanceRange {
    /// Switches to `url`, returning it when a fetch is needed.
    fn retarget(&mut self, url: Option<String>) -> Option<String> {
        if url == self.source {
            return None;
        }
        self.source = url.clone();
        self.range = None;
        url
    }

    fn store(&mut self, url: &str, range: Option<(f64, f64)>) -> bool {
        if self.source.as_deref() != Some(url) {
            return false;
        }
        self.range = range;
        true
    }
}

/// The control panel. Owns the DOM listeners it installs.
#[derive(Default)]
pub struct Gui {
    distance: DistanceRange,
    /// Listeners of the current panel.
    listeners: Vec<Listener>,
    /// Listeners of the previous panel, kept alive until the next rebuild
    /// in case one of them is still on the stack.
    retired: Vec<Listener>,
    /// Listeners on page elements that are never rebuilt.
    fixed: Vec<Listener>,
}

impl Gui {
    fn listen(
        doc: &Document,
        into: &mut Vec<Listener>,
        id: &str,
        event: &str,
        f: impl FnMut(Event) + 'static,
    ) {
        let Some(target) = doc.get_element_by_id(id) else {
            warn!(id, "missing element");
            return;
        };
        let cb = Listener::new(f);
        if target
            .add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())
            .is_ok()
        {
            into.push(cb);
        }
    }

    fn on(&mut self, doc: &Document, id: &str, event: &str, f: impl FnMut(Event) + 'static) {
        Self::listen(doc, &mut self.listeners, id, event, f);
    }

    fn on_fixed(&mut self, doc: &Document, id: &str, event: &str, f: impl FnMut(Event) + 'static) {
        Self::listen(doc, &mut self.fixed, id, event, f);
    }

    /// Wires the page toolbar, help and colour swatch. Called once.
    pub fn bind_page(&mut self, doc: &Document) {
        self.on_fixed(doc, "undo", "click", |_| {
            crate::dispatch(|v| v.undo());
        });
        self.on_fixed(doc, "redo", "click", |_| {
            crate::dispatch(|v| v.redo());
        });
        self.on_fixed(doc, "home", "click", |_| {
            crate::dispatch(|v| v.go_home());
        });
        self.on_fixed(doc, "sethome", "click", |_| {
            crate::dispatch(|v| v.set_home());
        });
        self.on_fixed(doc, "share", "click", |_| {
            if let Some(url) = crate::dispatch(|v| v.share_url()) {
                crate::alert(&format!("Share this view using the URL:\n{url}"));
            }
        });
        self.on_fixed(doc, "savestate", "click", |_| crate::save_state());
        self.on_fixed(doc, "loadstate", "change", crate::load_state);
        self.on_fixed(doc, "togglegui", "click", |_| {
            crate::dispatch(|v| v.toggle_gui());
        });
        self.on_fixed(doc, "help", "click", |_| {
            crate::dispatch(|v| v.toggle_help());
        });
        // The close button is recreated with the help text.
        self.on_fixed(doc, HELP, "click", |ev| {
            let on_close = ev
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                .is_some_and(|el| el.id() == "helpclose");
            if on_close {
                crate::dispatch(|v| {
                    if v.gui().help_visible {
                        v.toggle_help();
                    }
                });
            }
        });
        self.set_help(doc, None);
        self.bind_swatch(doc);
    }

    /// Shows `body` (or the default text) as help, with a close button.
    pub fn set_help(&self, doc: &Document, body: Option<&str>) {
        let Some(ht) = element(doc, HELP) else {
            return;
        };
        let html = match body {
            Some(body) => format!("<div class=margin5>{body}</div>{HELP_CLOSE}"),
            None => format!("{DEFAULT_HELP}{HELP_CLOSE}"),
        };
        ht.set_inner_html(&html);
    }

    /// Distance range URL of the active section, when it is not the one
    /// the current range came from. The old range is dropped.
    pub fn stale_distance_url(&mut self, viewer: &Viewer<JsRenderer>) -> Option<String> {
        let url = viewer.state().active_section().and_then(distance_range_url);
        self.distance.retarget(url)
    }

    /// Stores a fetched range. Returns false when the section has moved to
    /// another server since the request was made.
    pub fn set_distance_range(&mut self, url: &str, range: Option<(f64, f64)>) -> bool {
        self.distance.store(url, range)
    }

    fn bind_swatch(&mut self, doc: &Document) {
        let Some(body) = doc.body() else {
            return;
        };
        let Ok(panel) = doc.create_element("div") else {
            return;
        };
        panel.set_id(SWATCH_PANEL);
        let _ = panel.set_attribute("style", "display:none");
        panel.set_inner_html(&format!(
            "<img id=\"swatch\" src=\"icons/swatch.png\">\
             <img id=\"cancelswatch\" src=\"icons/cancel.png\">\
             <canvas id=\"{SWATCH_CANVAS}\" style=\"display:none\"></canvas>"
        ));
        let _ = body.append_child(&panel);

        self.on_fixed(doc, "swatch", "load", |ev| {
            let img = ev
                .target()
                .and_then(|t| t.dyn_into::<HtmlImageElement>().ok());
            if let Some(img) = img
                && let Some((canvas, ctx)) = swatch_canvas()
            {
                canvas.set_width(img.natural_width());
                canvas.set_height(img.natural_height());
                let _ = ctx.draw_image_with_html_image_element(&img, 0.0, 0.0);
            }
        });
        self.on_fixed(doc, "swatch", "click", |ev| {
            let picked = ev
                .dyn_ref::<MouseEvent>()
                .and_then(|m| swatch_pixel(m.offset_x(), m.offset_y()));
            crate::dispatch(|v| v.finish_color_pick(picked));
        });
        self.on_fixed(doc, "cancelswatch", "click", |_| {
            crate::dispatch(|v| v.finish_color_pick(None));
        });
    }

    /// Brings the DOM in line with `updates`.
    pub fn apply(&mut self, viewer: &Viewer<JsRenderer>, updates: &[ViewUpdate]) {
        let Some(doc) = document() else {
            return;
        };
        if updates.iter().any(|u| u.is_full_rebuild()) {
            self.rebuild(&doc, viewer);
            return;
        }
        for update in updates {
            self.patch(&doc, viewer, *update);
        }
    }

    fn patch(&mut self, doc: &Document, viewer: &Viewer<JsRenderer>, update: ViewUpdate) {
        let state = viewer.state();
        match update {
            ViewUpdate::Rebuild => self.rebuild(doc, viewer),
            ViewUpdate::ModelColor => set_background(doc, "model_color", &state.model.color),
            ViewUpdate::ModelVisible => set_src(
                doc,
                "model_visible",
                Visibility::from_visible(state.model_visible).icon(),
            ),
            ViewUpdate::ModelOpacity => {
                let value = state.model.opacity;
                set_input(doc, "model_opacity_number", value);
                set_input(doc, "model_opacity_range", MODEL_OPACITY_SLIDER.position_of(value));
            }
            ViewUpdate::SectionVisible => {
                if let Some(sec) = state.active_section() {
                    set_src(doc, "sectionvisible", Visibility::from_visible(sec.visible).icon());
                }
            }
            ViewUpdate::SectionClipping => {
                if let Some(sec) = state.active_section() {
                    set_src(doc, "sectionclip", ClipMode::of(sec).icon());
                }
            }
            ViewUpdate::SectionParam(param) => {
                if let Some(sec) = state.active_section() {
                    let id = section_id(param);
                    let value = param.get(sec);
                    let spec = param.slider(self.distance.range);
                    set_input(doc, &format!("{id}_number"), value);
                    set_input(doc, &format!("{id}_range"), spec.position_of(value));
                }
            }
            ViewUpdate::DomainSurfacesVisible => set_src(
                doc,
                "domainsurfacesvisible",
                Visibility::from_visible(state.domain_surfaces_visible).icon(),
            ),
            ViewUpdate::DomainSectionsVisible => set_src(
                doc,
                "domainsectionsvisible",
                Visibility::from_visible(state.domain_sections_visible).icon(),
            ),
            ViewUpdate::Domain(index) => {
                let Some(dom) = state.model.domains.get(index) else {
                    return;
                };
                for cat in &dom.categories {
                    set_background(doc, &format!("domainbutton{cat}-{index}"), &dom.color);
                    set_src(
                        doc,
                        &format!("domainvisible{cat}-{index}"),
                        Visibility::from_visible(dom.visible).icon(),
                    );
                }
            }
            ViewUpdate::CategoryOpen(cat) => {
                if let Some(list) = viewer.category_list(cat) {
                    set_src(doc, &format!("domainlistbutton{cat}"), list.icon());
                    set_display(doc, &format!("domaintable{cat}"), list_display(list));
                }
            }
            ViewUpdate::GuiVisible => {
                let display = if viewer.gui().show_gui { "block" } else { "none" };
                for id in PANELS {
                    set_display(doc, id, display);
                }
            }
            ViewUpdate::HelpVisible => {
                let display = if viewer.gui().help_visible { "block" } else { "none" };
                set_display(doc, HELP, display);
            }
            ViewUpdate::Swatch => {
                let display = if viewer.gui().swatch.is_some() { "block" } else { "none" };
                set_display(doc, SWATCH_PANEL, display);
            }
        }
    }

    fn rebuild(&mut self, doc: &Document, viewer: &Viewer<JsRenderer>) {
        self.retired = std::mem::take(&mut self.listeners);
        let state = viewer.state();
        doc.set_title(state.display_title());
        if let Some(info) = element(doc, "info") {
            info.set_inner_html(state.display_info());
        }

        let mut html = String::new();
        self.model_html(&mut html, viewer);
        self.section_html(&mut html, viewer);
        self.domains_html(&mut html, viewer);
        let Some(panel) = element(doc, OBJECT_PANEL) else {
            warn!("page has no object control panel");
            return;
        };
        panel.set_inner_html(&html);

        self.bind_model(doc);
        self.bind_section(doc, viewer);
        self.bind_domains(doc, viewer);

        for update in [
            ViewUpdate::GuiVisible,
            ViewUpdate::HelpVisible,
            ViewUpdate::Swatch,
        ] {
            self.patch(doc, viewer, update);
        }
    }

    fn model_html(&self, out: &mut String, viewer: &Viewer<JsRenderer>) {
        let state = viewer.state();
        let _ = write!(
            out,
            "<table width=\"100%\"><tr><td colspan=\"2\"><u>Model</u></td></tr>\
             <tr><td colspan=\"2\">Colour</td><td width=\"33%\">\
             <button id=\"model_color\" class=\"smbutton\" title=\"Select model colour\" \
             style=\"background:#{}\"></button></td></tr>",
            state.model.color
        );
        icon_row(
            out,
            "Visibility",
            "model_visible",
            "Toggle object visibility",
            Visibility::from_visible(state.model_visible).icon(),
        );
        slider_row(
            out,
            "model_opacity",
            "Opacity",
            MODEL_OPACITY_SLIDER,
            state.model.opacity,
        );
        out.push_str("</table>");
    }

    fn bind_model(&mut self, doc: &Document) {
        self.on(doc, "model_color", "click", |_| {
            crate::dispatch(|v| v.begin_color_pick(SwatchTarget::Model));
        });
        self.on(doc, "model_visible", "click", |_| {
            crate::dispatch(|v| v.toggle_model_visible());
        });
        self.on(doc, "model_opacity_range", "input", |ev| {
            if let Some(p) = input_value(&ev) {
                crate::dispatch(|v| v.set_model_opacity(MODEL_OPACITY_SLIDER.value_at(p)));
            }
        });
        self.on(doc, "model_opacity_number", "change", |ev| {
            if let Some(value) = input_value(&ev) {
                crate::dispatch(|v| v.set_model_opacity(value));
            }
        });
    }

    fn section_html(&self, out: &mut String, viewer: &Viewer<JsRenderer>) {
        let Some(sec) = viewer.state().active_section() else {
            return;
        };
        out.push_str("<table width=\"100%\"><tr><td colspan=\"2\"><u>Section</u></td></tr>");
        icon_row(
            out,
            "Visibility",
            "sectionvisible",
            "Toggle section visibility",
            Visibility::from_visible(sec.visible).icon(),
        );
        icon_row(
            out,
            "Clipping",
            "sectionclip",
            "Toggle section clipping",
            ClipMode::of(sec).icon(),
        );
        for param in SectionParam::ALL {
            slider_row(
                out,
                &section_id(param),
                param.label(),
                param.slider(self.distance.range),
                param.get(sec),
            );
        }
        out.push_str("</table>");
    }

    fn bind_section(&mut self, doc: &Document, viewer: &Viewer<JsRenderer>) {
        if viewer.state().active_section().is_none() {
            return;
        }
        self.on(doc, "sectionvisible", "click", |_| {
            crate::dispatch(|v| v.toggle_section_visible());
        });
        self.on(doc, "sectionclip", "click", |_| {
            crate::dispatch(|v| v.cycle_section_clipping());
        });
        for param in SectionParam::ALL {
            let id = section_id(param);
            let spec = param.slider(self.distance.range);
            self.on(doc, &format!("{id}_range"), "input", move |ev| {
                if let Some(p) = input_value(&ev) {
                    crate::dispatch(|v| v.set_section_param(param, spec.value_at(p)));
                }
            });
            self.on(doc, &format!("{id}_number"), "change", move |ev| {
                if let Some(value) = input_value(&ev) {
                    let value = match spec.kind {
                        SliderKind::Int => value.round(),
                        SliderKind::Float | SliderKind::Log => value,
                    };
                    crate::dispatch(|v| v.set_section_param(param, value));
                }
            });
        }
    }

    fn domains_html(&self, out: &mut String, viewer: &Viewer<JsRenderer>) {
        let state = viewer.state();
        out.push_str("<table width=\"100%\"><tr><td colspan=\"2\"><u>Domains</u></td></tr>");
        icon_row(
            out,
            "Surface Visibility",
            "domainsurfacesvisible",
            "Toggle domain surface visibility",
            Visibility::from_visible(state.domain_surfaces_visible).icon(),
        );
        icon_row(
            out,
            "Section Visibility",
            "domainsectionsvisible",
            "Toggle domain section visibility",
            Visibility::from_visible(state.domain_sections_visible).icon(),
        );
        for (cat, members) in viewer.categories().iter() {
            let list = viewer.category_list(cat).unwrap_or_default();
            let name = state
                .domain_selectors
                .get(cat)
                .map(|s| escape(&s.name))
                .unwrap_or_default();
            let _ = write!(
                out,
                "<tr id=\"catagory{cat}\"><td>{name}</td>\
                 <td><img align=\"middle\" id=\"domainlistbutton{cat}\" \
                 title=\"Toggle domain list\" src=\"{}\"></td></tr>\
                 <tr><td colspan=\"3\" style=\"border-style:none none none solid\">\
                 <table id=\"domaintable{cat}\" style=\"padding:0px;display:{}\">",
                list.icon(),
                list_display(list),
            );
            for &idx in members {
                let dom = &state.model.domains[idx];
                let _ = write!(
                    out,
                    "<tr><td>{}</td><td style=\"padding:0px\">\
                     <button id=\"domainbutton{cat}-{idx}\" class=\"smbutton\" \
                     title=\"Select domain colour\" style=\"background:#{}\"></button></td>\
                     <td style=\"padding:0px\"><img align=\"middle\" id=\"domainvisible{cat}-{idx}\" \
                     title=\"Toggle domain visibility\" src=\"{}\"></td></tr>",
                    escape(&dom.name),
                    dom.color,
                    Visibility::from_visible(dom.visible).icon(),
                );
            }
            out.push_str("</table></td></tr>");
        }
        out.push_str("</table>");
    }

    fn bind_domains(&mut self, doc: &Document, viewer: &Viewer<JsRenderer>) {
        self.on(doc, "domainsurfacesvisible", "click", |_| {
            crate::dispatch(|v| {
                let visible = !v.state().domain_surfaces_visible;
                v.set_domain_surfaces_visible(visible);
            });
        });
        self.on(doc, "domainsectionsvisible", "click", |_| {
            crate::dispatch(|v| {
                let visible = !v.state().domain_sections_visible;
                v.set_domain_sections_visible(visible);
            });
        });
        let categories: Vec<(usize, Vec<usize>)> = viewer
            .categories()
            .iter()
            .map(|(cat, members)| (cat, members.to_vec()))
            .collect();
        for (cat, members) in categories {
            self.on(doc, &format!("domainlistbutton{cat}"), "click", move |_| {
                crate::dispatch(|v| v.toggle_category_open(cat));
            });
            for idx in members {
                self.on(doc, &format!("domainbutton{cat}-{idx}"), "click", move |_| {
                    crate::dispatch(|v| v.begin_color_pick(SwatchTarget::Domain(idx)));
                });
                self.on(doc, &format!("domainvisible{cat}-{idx}"), "click", move |_| {
                    crate::dispatch(|v| v.toggle_domain_visible(idx));
                });
            }
        }
    }
}

fn list_display(list: ListState) -> &'static str {
    if list.is_open() { "table" } else { "none" }
}

fn swatch_canvas() -> Option<(HtmlCanvasElement, CanvasRenderingContext2d)> {
    let canvas = document()?
        .get_element_by_id(SWATCH_CANVAS)?
        .dyn_into::<HtmlCanvasElement>()
        .ok()?;
    let ctx = canvas
        .get_context("2d")
        .ok()??
        .dyn_into::<CanvasRenderingContext2d>()
        .ok()?;
    Some((canvas, ctx))
}

/// RGB of the swatch image at (`x`, `y`).
fn swatch_pixel(x: i32, y: i32) -> Option<[u8; 3]> {
    let (_, ctx) = swatch_canvas()?;
    let Clamped(data) = ctx
        .get_image_data(f64::from(x), f64::from(y), 1.0, 1.0)
        .ok()?
        .data();
    match data.as_slice() {
        [r, g, b, ..] => Some([*r, *g, *b]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::DistanceRange;
    use pretty_assertions::assert_eq;

    #[test]
    fn distance_range_refetches_only_on_new_server() {
        let mut d = DistanceRange::default();
        assert_eq!(d.retarget(None), None);
        let url = "http://iip/fcgi?wlz=/a.wlz&OBJ=Wlz-distance-range".to_string();
        assert_eq!(d.retarget(Some(url.clone())), Some(url.clone()));
        assert!(d.store(&url, Some((-5.0, 5.0))));
        assert_eq!(d.retarget(Some(url.clone())), None);
        assert_eq!(d.range, Some((-5.0, 5.0)));

        assert_eq!(d.retarget(None), None);
        assert_eq!(d.range, None);
    }

    #[test]
    fn late_range_for_old_server_is_dropped() {
        let mut d = DistanceRange::default();
        d.retarget(Some("old".to_string()));
        d.retarget(Some("new".to_string()));
        assert!(!d.store("old", Some((0.0, 1.0))));
        assert_eq!(d.range, None);
        assert!(d.store("new", Some((2.0, 3.0))));
        assert_eq!(d.range, Some((2.0, 3.0)));
    }
}
