//! Catalog browser: taxonomy-driven filter checkboxes, a paginated item
//! grid, and the hand-off of a picked garment to the try-on screen.

use std::collections::BTreeSet;

use egui::Vec2;

use crate::api::ApiClient;
use crate::images::ImageStore;
use crate::inbox::Inbox;
use crate::models::{ClothingItem, FilterSelection, FilterTaxonomy};
use crate::platform;
use crate::ui::toasts::Toasts;

pub const ITEMS_PER_PAGE: usize = 12;
const GRID_COLUMNS: usize = 4;

pub enum CatalogAction {
    TryOn(ClothingItem),
}

pub struct CatalogScreen {
    taxonomy: Option<FilterTaxonomy>,
    taxonomy_inbox: Inbox<Result<FilterTaxonomy, String>>,
    items: Vec<ClothingItem>,
    items_inbox: Inbox<Result<Vec<ClothingItem>, String>>,
    selection: FilterSelection,
    page: usize,
    loading: bool,
    started: bool,
}

impl Default for CatalogScreen {
    fn default() -> Self {
        Self {
            taxonomy: None,
            taxonomy_inbox: Inbox::new(),
            items: Vec::new(),
            items_inbox: Inbox::new(),
            selection: FilterSelection::default(),
            page: 0,
            loading: false,
            started: false,
        }
    }
}

impl CatalogScreen {
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        api: &ApiClient,
        images: &mut ImageStore,
        toasts: &mut Toasts,
    ) -> Option<CatalogAction> {
        let ctx = ui.ctx().clone();
        if !self.started {
            self.started = true;
            self.fetch_taxonomy(api, &ctx);
            self.fetch_items(api, &ctx);
        }
        self.pump(toasts);

        let mut action = None;
        egui::SidePanel::left("catalog_filters")
            .resizable(false)
            .min_width(160.0)
            .show_inside(ui, |ui| {
                if self.filter_panel(ui) {
                    self.page = 0;
                    self.fetch_items(api, &ctx);
                }
            });

        egui::CentralPanel::default().show_inside(ui, |ui| {
            if self.loading {
                ui.spinner();
                return;
            }
            // Re-validate client-side so stale cached results never leak
            // through a changed filter.
            let visible: Vec<&ClothingItem> = self
                .items
                .iter()
                .filter(|item| item.matches(&self.selection))
                .collect();

            if visible.is_empty() {
                ui.label("Nothing matches the current filters.");
                return;
            }

            let pages = page_count(visible.len(), ITEMS_PER_PAGE);
            self.page = self.page.min(pages - 1);
            let (from, to) = page_bounds(visible.len(), self.page, ITEMS_PER_PAGE);

            egui::ScrollArea::vertical().show(ui, |ui| {
                egui::Grid::new("catalog_grid")
                    .num_columns(GRID_COLUMNS)
                    .spacing(Vec2::splat(10.0))
                    .show(ui, |ui| {
                        for (i, item) in visible[from..to].iter().enumerate() {
                            if let Some(a) = item_card(ui, images, item) {
                                action = Some(a);
                            }
                            if (i + 1) % GRID_COLUMNS == 0 {
                                ui.end_row();
                            }
                        }
                    });
            });

            ui.separator();
            ui.horizontal(|ui| {
                if ui.add_enabled(self.page > 0, egui::Button::new("Prev")).clicked() {
                    self.page -= 1;
                }
                ui.label(format!("page {} of {}", self.page + 1, pages));
                if ui
                    .add_enabled(self.page + 1 < pages, egui::Button::new("Next"))
                    .clicked()
                {
                    self.page += 1;
                }
            });
        });

        action
    }

    /// Returns true when any checkbox changed.
    fn filter_panel(&mut self, ui: &mut egui::Ui) -> bool {
        let Some(taxonomy) = self.taxonomy.clone() else {
            ui.spinner();
            return false;
        };
        let mut changed = false;
        ui.heading("Filters");

        changed |= checkbox_group(ui, "Category", &taxonomy.categories, &mut self.selection.categories);
        changed |= checkbox_group(ui, "Color", &taxonomy.colors, &mut self.selection.colors);
        changed |= checkbox_group(ui, "Archetype", &taxonomy.archetypes, &mut self.selection.archetypes);

        ui.separator();
        ui.label("Gender");
        let mut gender = self.selection.gender.clone();
        if ui.selectable_label(gender.is_none(), "any").clicked() {
            gender = None;
        }
        for option in &taxonomy.genders {
            let active = gender.as_deref() == Some(option.as_str());
            if ui.selectable_label(active, option).clicked() {
                gender = if active { None } else { Some(option.clone()) };
            }
        }
        if gender != self.selection.gender {
            self.selection.gender = gender;
            changed = true;
        }

        if !self.selection.is_empty() && ui.button("Clear filters").clicked() {
            self.selection = FilterSelection::default();
            changed = true;
        }
        changed
    }

    fn pump(&mut self, toasts: &mut Toasts) {
        while let Some(result) = self.taxonomy_inbox.next() {
            match result {
                Ok(taxonomy) => self.taxonomy = Some(taxonomy),
                Err(e) => toasts.error(format!("Could not load filters: {e}")),
            }
        }
        while let Some(result) = self.items_inbox.next() {
            self.loading = false;
            match result {
                Ok(items) => self.items = items,
                Err(e) => toasts.error(format!("Could not load the catalog: {e}")),
            }
        }
    }

    fn fetch_taxonomy(&mut self, api: &ApiClient, ctx: &egui::Context) {
        let tx = self.taxonomy_inbox.sender();
        let api = api.clone();
        let ctx = ctx.clone();
        platform::execute(async move {
            let result = api.fetch_filters().await.map_err(|e| e.to_string());
            let _ = tx.unbounded_send(result);
            ctx.request_repaint();
        });
    }

    pub fn fetch_items(&mut self, api: &ApiClient, ctx: &egui::Context) {
        self.loading = true;
        let tx = self.items_inbox.sender();
        let api = api.clone();
        let ctx = ctx.clone();
        let selection = self.selection.clone();
        platform::execute(async move {
            let result = api.fetch_items(&selection).await.map_err(|e| e.to_string());
            let _ = tx.unbounded_send(result);
            ctx.request_repaint();
        });
    }
}

fn checkbox_group(
    ui: &mut egui::Ui,
    title: &str,
    options: &[String],
    selected: &mut BTreeSet<String>,
) -> bool {
    let mut changed = false;
    ui.separator();
    ui.label(title);
    for option in options {
        let mut checked = selected.contains(option);
        if ui.checkbox(&mut checked, option).changed() {
            changed = true;
            if checked {
                selected.insert(option.clone());
            } else {
                selected.remove(option);
            }
        }
    }
    changed
}

fn item_card(
    ui: &mut egui::Ui,
    images: &mut ImageStore,
    item: &ClothingItem,
) -> Option<CatalogAction> {
    let mut action = None;
    ui.group(|ui| {
        ui.set_width(150.0);
        ui.vertical(|ui| {
            let ctx = ui.ctx().clone();
            match images.get(&ctx, &item.image_url).cloned() {
                Some(texture) => {
                    let [w, h] = texture.size();
                    let size = Vec2::new(w as f32, h as f32);
                    let scale = (140.0 / size.x).min(140.0 / size.y);
                    ui.add(egui::Image::new(&texture).fit_to_exact_size(size * scale));
                }
                None => {
                    ui.add_sized(Vec2::splat(140.0), egui::Spinner::new());
                }
            }
            ui.strong(&item.name);
            if !item.colors.is_empty() {
                ui.weak(item.colors.join(", "));
            }
            if ui.button("Try on").clicked() {
                action = Some(CatalogAction::TryOn(item.clone()));
            }
        });
    });
    action
}

/// Number of pages needed for `total` entries (at least one).
pub fn page_count(total: usize, per_page: usize) -> usize {
    total.div_ceil(per_page).max(1)
}

/// Half-open index range of one page, clamped to the collection.
pub fn page_bounds(total: usize, page: usize, per_page: usize) -> (usize, usize) {
    let from = (page * per_page).min(total);
    let to = (from + per_page).min(total);
    (from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_math_covers_everything_without_overlap() {
        assert_eq!(page_count(0, 12), 1);
        assert_eq!(page_count(12, 12), 1);
        assert_eq!(page_count(13, 12), 2);

        assert_eq!(page_bounds(30, 0, 12), (0, 12));
        assert_eq!(page_bounds(30, 1, 12), (12, 24));
        assert_eq!(page_bounds(30, 2, 12), (24, 30));
        // out-of-range pages clamp to empty
        assert_eq!(page_bounds(30, 9, 12), (30, 30));
    }
}
