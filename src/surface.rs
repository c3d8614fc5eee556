//! Where fetch results end up.

/// The single result screen: a display area, transient notifications and the
/// request-permission control.
pub trait Surface {
    /// Replaces whatever is shown with `items`.
    fn render(&mut self, items: Vec<String>);

    fn notify(&mut self, message: &str);

    fn set_request_visible(&mut self, visible: bool);
}

/// What a [`ListSurface`] render changed, by position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListDiff {
    pub unchanged: usize,
    pub changed: usize,
    pub inserted: usize,
    pub removed: usize,
}

/// Row list display. Rows equal by value at the same position are kept.
#[derive(Debug, Default)]
pub struct ListSurface {
    rows: Vec<String>,
    last_diff: ListDiff,
    notifications: Vec<String>,
    request_visible: bool,
}

impl ListSurface {
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn last_diff(&self) -> ListDiff {
        self.last_diff
    }

    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    pub fn request_visible(&self) -> bool {
        self.request_visible
    }
}

impl Surface for ListSurface {
    fn render(&mut self, items: Vec<String>) {
        let shared = self.rows.len().min(items.len());
        let unchanged = self
            .rows
            .iter()
            .zip(&items)
            .filter(|(old, new)| old == new)
            .count();

        self.last_diff = ListDiff {
            unchanged,
            changed: shared - unchanged,
            inserted: items.len() - shared,
            removed: self.rows.len() - shared,
        };

        tracing::trace!(diff = ?self.last_diff, "list rendered");

        self.rows = items;
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_owned());
    }

    fn set_request_visible(&mut self, visible: bool) {
        self.request_visible = visible;
    }
}

/// Plain text display, one row per line. Fallback for hosts without a list
/// widget.
#[derive(Debug, Default)]
pub struct TextSurface {
    text: String,
    notifications: Vec<String>,
    request_visible: bool,
}

impl TextSurface {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    pub fn request_visible(&self) -> bool {
        self.request_visible
    }
}

impl Surface for TextSurface {
    fn render(&mut self, items: Vec<String>) {
        self.text = items.join("\n");
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_owned());
    }

    fn set_request_visible(&mut self, visible: bool) {
        self.request_visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(items: &[&str]) -> Vec<String> {
        items.iter().copied().map(String::from).collect()
    }

    #[test]
    fn list_render_replaces_rows() {
        let mut surface = ListSurface::default();
        surface.render(rows(&["a", "b", "c"]));
        assert_eq!(
            surface.last_diff(),
            ListDiff {
                inserted: 3,
                ..Default::default()
            }
        );

        surface.render(rows(&["a", "x"]));
        assert_eq!(surface.rows(), ["a", "x"]);
        assert_eq!(
            surface.last_diff(),
            ListDiff {
                unchanged: 1,
                changed: 1,
                inserted: 0,
                removed: 1
            }
        );
    }

    #[test]
    fn text_render_discards_previous_text() {
        let mut surface = TextSurface::default();
        surface.render(rows(&["first"]));
        surface.render(rows(&["a", "b"]));
        assert_eq!(surface.text(), "a\nb");
    }
}
