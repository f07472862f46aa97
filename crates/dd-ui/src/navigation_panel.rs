//! Sidebar with the page selector

use egui::{Context, Frame, Margin, RichText, SidePanel};

use dd_core::{AppState, Page};

use crate::theme::sidebar_color;

/// Navigation sidebar
pub struct NavigationPanel {
    width: f32,
}

impl Default for NavigationPanel {
    fn default() -> Self {
        Self { width: 260.0 }
    }
}

impl NavigationPanel {
    pub fn new(width: f32) -> Self {
        Self { width }
    }

    /// Draw the sidebar; a radio click switches the page in `state`
    pub fn show(&self, ctx: &Context, state: &mut AppState) {
        SidePanel::left("navigation_panel")
            .resizable(false)
            .exact_width(self.width)
            .frame(Frame::none().fill(sidebar_color()).inner_margin(Margin::same(12.0)))
            .show(ctx, |ui| {
                ui.heading("Navigation");
                ui.add_space(8.0);
                ui.label(RichText::new("Go to").strong());

                let mut selected = state.page();
                for page in Page::ALL {
                    ui.radio_value(&mut selected, page, page.label());
                }
                state.set_page(selected);
            });
    }
}
