//! Terminal presentation of the food list.

use clap::ValueEnum;
use foodmenu_core::{Food, ItemSyncStore, StoreObserver};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// JSON shape of an item, including its key.
#[derive(Debug, Serialize)]
pub struct FoodView<'a> {
    pub id: Option<&'a str>,
    pub name: &'a str,
    pub price: &'a str,
}

impl<'a> From<&'a Food> for FoodView<'a> {
    fn from(food: &'a Food) -> Self {
        Self {
            id: food.id.as_ref().map(|id| id.as_str()),
            name: &food.name,
            price: &food.price,
        }
    }
}

/// One list row: price, name and key.
pub fn format_line(food: &Food, currency: &str) -> String {
    match &food.id {
        Some(id) => format!("{:>8}  {}  ({})", food.display_price(currency), food.name, id),
        None => format!("{:>8}  {}", food.display_price(currency), food.name),
    }
}

/// Writes the list and detail views, and re-renders on store changes.
pub struct ListRenderer<W: Write> {
    out: W,
    currency: String,
    paused: bool,
}

impl<W: Write> ListRenderer<W> {
    pub fn new(out: W, currency: impl Into<String>) -> Self {
        Self {
            out,
            currency: currency.into(),
            paused: false,
        }
    }

    /// Starts without re-rendering on store changes until [`resume`](Self::resume).
    pub fn paused(mut self) -> Self {
        self.paused = true;
        self
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn render_list(&mut self, items: &[Food]) -> io::Result<()> {
        if items.is_empty() {
            return writeln!(self.out, "No food items.");
        }
        for food in items {
            writeln!(self.out, "{}", format_line(food, &self.currency))?;
        }
        Ok(())
    }

    pub fn render_detail(&mut self, food: &Food) -> io::Result<()> {
        writeln!(self.out, "{}", food.name)?;
        writeln!(self.out, "{}", "=".repeat(food.name.chars().count()))?;
        writeln!(self.out, "Price: {}", food.display_price(&self.currency))?;
        if let Some(id) = &food.id {
            writeln!(self.out, "ID: {}", id)?;
        }
        Ok(())
    }

    pub fn render_json(&mut self, items: &[Food]) -> io::Result<()> {
        let views: Vec<FoodView> = items.iter().map(FoodView::from).collect();
        let json = serde_json::to_string_pretty(&views).map_err(io::Error::other)?;
        writeln!(self.out, "{}", json)
    }

    #[cfg(test)]
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> StoreObserver for ListRenderer<W> {
    fn store_changed(&mut self, store: &ItemSyncStore) {
        if self.paused {
            return;
        }
        let result = writeln!(self.out, "\nMenu ({} items)", store.len())
            .and_then(|_| self.render_list(store.get_all()))
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            tracing::warn!("Failed to render list: {}", e);
        }
    }

    fn item_moved(&mut self, food: &Food) {
        if let Err(e) = writeln!(self.out, "Moved: {}", food) {
            tracing::warn!("Failed to render notice: {}", e);
        }
    }

    fn subscription_cancelled(&mut self, reason: &str) {
        if let Err(e) = writeln!(self.out, "Cancelled: {}", reason) {
            tracing::warn!("Failed to render notice: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(renderer: ListRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn test_format_line() {
        let food = Food::new("Burger", "5").with_id("-Na");
        assert_eq!(format_line(&food, "$"), "      $5  Burger  (-Na)");
        assert_eq!(format_line(&Food::new("Fries", "2"), "€"), "      €2  Fries");
    }

    #[test]
    fn test_render_empty_list() {
        let mut renderer = ListRenderer::new(Vec::new(), "$");
        renderer.render_list(&[]).unwrap();
        assert_eq!(output(renderer), "No food items.\n");
    }

    #[test]
    fn test_render_detail() {
        let mut renderer = ListRenderer::new(Vec::new(), "$");
        renderer
            .render_detail(&Food::new("Burger", "5").with_id("-Na"))
            .unwrap();
        assert_eq!(output(renderer), "Burger\n======\nPrice: $5\nID: -Na\n");
    }

    #[test]
    fn test_render_json_includes_id() {
        let mut renderer = ListRenderer::new(Vec::new(), "$");
        renderer
            .render_json(&[Food::new("Burger", "5").with_id("-Na")])
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output(renderer)).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!([{"id": "-Na", "name": "Burger", "price": "5"}])
        );
    }

    #[test]
    fn test_observer_rerenders_whole_list() {
        let mut store = ItemSyncStore::new();
        let mut renderer = ListRenderer::new(Vec::new(), "$");

        store.on_item_added(Food::new("Burger", "5").with_id("-Na"));
        renderer.store_changed(&store);
        store.on_item_added(Food::new("Fries", "2").with_id("-Nb"));
        renderer.store_changed(&store);

        let text = output(renderer);
        assert_eq!(text.matches("Burger").count(), 2);
        assert_eq!(text.matches("Fries").count(), 1);
        assert!(text.contains("Menu (2 items)"));
    }

    #[test]
    fn test_observer_notices() {
        let mut renderer = ListRenderer::new(Vec::new(), "$");
        renderer.item_moved(&Food::new("Burger", "5").with_id("-Na"));
        renderer.subscription_cancelled("Permission denied");
        assert_eq!(output(renderer), "Moved: Burger\nCancelled: Permission denied\n");
    }

    #[test]
    fn test_paused_observer_skips_renders() {
        let mut store = ItemSyncStore::new();
        store.on_item_added(Food::new("Burger", "5").with_id("-Na"));
        let mut renderer = ListRenderer::new(Vec::new(), "$").paused();

        renderer.store_changed(&store);
        renderer.item_moved(&store.get_all()[0]);
        assert_eq!(renderer.get_ref().as_slice(), b"Moved: Burger\n");

        renderer.resume();
        renderer.store_changed(&store);
        assert!(output(renderer).contains("Menu (1 items)"));
    }
}
