//! The shared page shell, style constants, and currency formatting used by
//! the maud views.

use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, html};
use numfmt::{Formatter, Precision};

// Link styles
pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500 \
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

// Form styles
pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center px-6 py-8 \
    mx-auto lg:py-0 max-w-md text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Summary card style
pub const CARD_STYLE: &str = "p-4 rounded border border-gray-200 bg-white \
    dark:bg-gray-800 dark:border-gray-700";

pub const PAGE_CONTAINER_STYLE: &str = "px-4 py-6 mx-auto max-w-screen-lg \
    text-gray-900 dark:text-white";

/// The common HTML page shell: head, scripts, and the alert container that
/// htmx swaps flash messages into.
pub fn base(title: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)

        html lang="pt-BR"
        {
            head
            {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " - Contas" }

                script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                script
                    src="https://unpkg.com/htmx.org@2.0.8"
                    integrity="sha384-pQV36VWIiTCnvSPRWJANzNYx1g5lWToLmFKzRCkOCOZz0cfx6HZArz0AWd4Ujesj"
                    crossorigin="anonymous" {}
                script src="https://unpkg.com/htmx-ext-response-targets@2.0.4" {}
            }

            body
                hx-ext="response-targets"
                class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900 pb-8"
            {
                (content)

                // Alert container for out-of-band swaps
                div
                    id="alert-container"
                    class="hidden w-full max-w-md px-4"
                    style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
                {}
            }
        }
    }
}

/// Format `amount` as Brazilian reais with a thousands separator,
/// e.g. `R$ 1.234,56`.
pub fn format_reais(amount: f64) -> String {
    let formatter = get_currency_formatter();

    let mut formatted = if amount < 0.0 {
        format!("-R$ {}", formatter.fmt_string(-amount))
    } else if amount > 0.0 {
        format!("R$ {}", formatter.fmt_string(amount))
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        return "R$ 0,00".to_owned();
    };

    // numfmt omits the last trailing zero, so we must add it ourselves
    // For example, "12,30" is rendered as "12,3" so we append "0".
    if formatted.as_bytes()[formatted.len() - 3] != b',' {
        formatted = format!("{formatted}0");
    }

    formatted
}

fn get_currency_formatter() -> &'static Formatter {
    static FORMATTER: OnceLock<Formatter> = OnceLock::new();

    // A period separator makes numfmt use a comma for the decimal marker,
    // which gives the Brazilian "1.234,56" shape.
    FORMATTER.get_or_init(|| {
        Formatter::new()
            .separator('.')
            .unwrap()
            .precision(Precision::Decimals(2))
    })
}

#[cfg(test)]
mod html_tests {
    use super::format_reais;

    #[test]
    fn formats_positive_amounts_with_thousands_separator() {
        let formatted = format_reais(1234.5);

        assert!(formatted.starts_with("R$ "), "got {formatted}");
        assert!(formatted.contains("1.234"), "got {formatted}");
    }

    #[test]
    fn uses_brazilian_separators() {
        assert_eq!(format_reais(1234.56), "R$ 1.234,56");
    }

    #[test]
    fn formats_negative_amounts_with_leading_sign() {
        let formatted = format_reais(-99.9);

        assert!(formatted.starts_with("-R$ "), "got {formatted}");
        assert!(!formatted.contains("--"), "got {formatted}");
    }

    #[test]
    fn formats_zero_with_two_decimals() {
        assert_eq!(format_reais(0.0), "R$ 0,00");
    }

    #[test]
    fn pads_dropped_trailing_zero() {
        let formatted = format_reais(12.3);

        assert!(formatted.ends_with("12,30"), "got {formatted}");
    }
}
