//! Card components for the maaser summary.

use maud::{Markup, html};

use crate::{dashboard::aggregation::MaaserSummary, html::format_currency};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-6 shadow-md flex flex-col justify-between";

fn summary_card(key: &str, title: &str, amount: &str, amount_class: &str, note: &str) -> Markup {
    html! {
        div class=(CARD_STYLE) data-summary=(key)
        {
            h3 class="text-sm font-medium text-gray-600 dark:text-gray-400 uppercase" { (title) }
            p class={ "mt-2 text-3xl font-bold " (amount_class) } data-amount { (amount) }
            p class="mt-3 text-sm text-gray-500 dark:text-gray-400" { (note) }
        }
    }
}

/// Renders the income, maaser given and maaser owed cards.
///
/// `period_label` describes the period income was counted over, e.g. "Gregorian year 2025".
pub(super) fn summary_cards_view(summary: &MaaserSummary, period_label: &str) -> Markup {
    let (owed_class, owed_note) = if summary.owed > 0.0 {
        ("text-red-600 dark:text-red-400", "Still to give for this period.".to_owned())
    } else if summary.owed < 0.0 {
        (
            "text-green-600 dark:text-green-400",
            format!(
                "You have given {} more than required.",
                format_currency(summary.owed.abs())
            ),
        )
    } else {
        (
            "text-green-600 dark:text-green-400",
            "You are up to date.".to_owned(),
        )
    };

    html! {
        section class="grid grid-cols-1 md:grid-cols-3 gap-4 w-full"
        {
            (summary_card(
                "income",
                "Income",
                &format_currency(summary.income),
                "text-gray-900 dark:text-white",
                &format!("Received during the {period_label}."),
            ))
            (summary_card(
                "maaser-given",
                "Maaser Given",
                &format_currency(summary.maaser_given),
                "text-blue-600 dark:text-blue-400",
                "Counts everything given since you started, not only this period.",
            ))
            (summary_card(
                "owed",
                "Maaser Owed",
                &format_currency(summary.owed),
                owed_class,
                &owed_note,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::dashboard::aggregation::MaaserSummary;

    use super::summary_cards_view;

    fn card_class(html: &Html, key: &str) -> String {
        let selector = Selector::parse(&format!("[data-summary={key}] [data-amount]")).unwrap();
        html.select(&selector)
            .next()
            .unwrap_or_else(|| panic!("No amount found for {key}"))
            .value()
            .attr("class")
            .unwrap_or_default()
            .to_owned()
    }

    #[test]
    fn owed_is_red_while_outstanding() {
        let markup = summary_cards_view(&MaaserSummary::new(1000.0, 50.0), "Gregorian year 2025");
        let html = Html::parse_fragment(&markup.into_string());

        assert!(card_class(&html, "owed").contains("text-red-600"));
    }

    #[test]
    fn owed_is_green_when_paid_up() {
        let markup = summary_cards_view(&MaaserSummary::new(1000.0, 150.0), "Gregorian year 2025");
        let html = Html::parse_fragment(&markup.into_string());

        assert!(card_class(&html, "owed").contains("text-green-600"));
        assert!(html.html().contains("You have given €50.00 more than required."));
    }
}
