//! Input forms.

use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::catalog::NewProductInput;
use crate::loader::{parse_price, parse_quantity};

/// Single-field prompt used by the View command.
#[derive(Default, Clone)]
pub(crate) struct LookupForm {
    pub(crate) id: String,
    pub(crate) error: Option<String>,
}

impl LookupForm {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_ascii_digit() {
            self.id.push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.id.pop();
    }

    pub(crate) fn parse_id(&self) -> Result<i64> {
        self.id
            .trim()
            .parse::<i64>()
            .map_err(|_| anyhow!("Invalid input. Please enter a valid product ID."))
    }
}

/// Form state for the New command.
#[derive(Default, Clone)]
pub(crate) struct ProductForm {
    pub(crate) name: String,
    pub(crate) quantity: String,
    pub(crate) price: String,
    pub(crate) brand: String,
    pub(crate) active: ProductField,
    pub(crate) error: Option<String>,
}

/// Fields of the product form, in tab order.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum ProductField {
    #[default]
    Name,
    Quantity,
    Price,
    Brand,
}

impl ProductField {
    pub(crate) const ALL: [ProductField; 4] = [
        ProductField::Name,
        ProductField::Quantity,
        ProductField::Price,
        ProductField::Brand,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            ProductField::Name => "Name",
            ProductField::Quantity => "Quantity",
            ProductField::Price => "Price ($)",
            ProductField::Brand => "Brand",
        }
    }

    fn row(self) -> u16 {
        match self {
            ProductField::Name => 0,
            ProductField::Quantity => 1,
            ProductField::Price => 2,
            ProductField::Brand => 3,
        }
    }
}

impl ProductForm {
    /// Move focus forward, wrapping at the end.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            ProductField::Name => ProductField::Quantity,
            ProductField::Quantity => ProductField::Price,
            ProductField::Price => ProductField::Brand,
            ProductField::Brand => ProductField::Name,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            ProductField::Name => ProductField::Brand,
            ProductField::Quantity => ProductField::Name,
            ProductField::Price => ProductField::Quantity,
            ProductField::Brand => ProductField::Price,
        };
    }

    fn value(&self, field: ProductField) -> &String {
        match field {
            ProductField::Name => &self.name,
            ProductField::Quantity => &self.quantity,
            ProductField::Price => &self.price,
            ProductField::Brand => &self.brand,
        }
    }

    fn value_mut(&mut self, field: ProductField) -> &mut String {
        match field {
            ProductField::Name => &mut self.name,
            ProductField::Quantity => &mut self.quantity,
            ProductField::Price => &mut self.price,
            ProductField::Brand => &mut self.brand,
        }
    }

    /// Append a character to the active field, rejecting characters that can
    /// never be valid there.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let allowed = match self.active {
            ProductField::Quantity => ch.is_ascii_digit(),
            ProductField::Price => ch.is_ascii_digit() || ch == '.' || ch == '$',
            ProductField::Name | ProductField::Brand => !ch.is_control(),
        };
        if allowed {
            self.value_mut(self.active).push(ch);
        }
        allowed
    }

    pub(crate) fn backspace(&mut self) {
        let active = self.active;
        self.value_mut(active).pop();
    }

    /// Validate the inputs with the same rules the CSV loader applies.
    pub(crate) fn parse_inputs(&self) -> Result<NewProductInput> {
        if self.name.trim().is_empty() {
            return Err(anyhow!("Product name is required."));
        }
        // Brand names match exactly, so the typed text is kept as-is.
        if self.brand.trim().is_empty() {
            return Err(anyhow!("Brand name is required."));
        }
        let quantity = parse_quantity(&self.quantity)?;
        let price = parse_price(&self.price)?;

        Ok(NewProductInput {
            name: self.name.clone(),
            quantity,
            price,
            brand_name: self.brand.clone(),
        })
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: ProductField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Cursor offset (column, row) of the active field inside the form body.
    pub(crate) fn cursor_offset(&self) -> (u16, u16) {
        let label = self.active.label().len() + 2;
        let column = label + self.value(self.active).chars().count();
        (column as u16, self.active.row())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cents;

    fn filled() -> ProductForm {
        ProductForm {
            name: "Widget".into(),
            quantity: "10".into(),
            price: "$2.99".into(),
            brand: "Acme".into(),
            ..ProductForm::default()
        }
    }

    #[test]
    fn parses_a_complete_form() {
        let input = filled().parse_inputs().unwrap();
        assert_eq!(input.name, "Widget");
        assert_eq!(input.quantity, 10);
        assert_eq!(input.price, Cents(299));
        assert_eq!(input.brand_name, "Acme");
    }

    #[test]
    fn rejects_blank_name_and_bad_price() {
        let mut form = filled();
        form.name = "  ".into();
        assert!(form.parse_inputs().is_err());

        let mut form = filled();
        form.price = "2..9".into();
        assert!(form.parse_inputs().is_err());
    }

    #[test]
    fn quantity_field_only_takes_digits() {
        let mut form = ProductForm::default();
        form.next_field();
        assert!(form.push_char('4'));
        assert!(!form.push_char('x'));
        assert!(!form.push_char('-'));
        assert_eq!(form.quantity, "4");
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = ProductForm::default();
        form.previous_field();
        assert!(form.active == ProductField::Brand);
        form.next_field();
        assert!(form.active == ProductField::Name);
    }

    #[test]
    fn lookup_form_requires_digits() {
        let mut form = LookupForm::default();
        assert!(!form.push_char('a'));
        assert!(form.parse_id().is_err());
        form.push_char('4');
        form.push_char('2');
        assert_eq!(form.parse_id().unwrap(), 42);
    }
}
