use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::probe::RawUnit;

/// CSS selectors locating reply units and their fields in a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSelectors {
    pub unit: String,
    pub text: String,
    pub author: String,
    pub time: String,
}

impl Default for UnitSelectors {
    fn default() -> Self {
        Self {
            unit: r#"article[data-testid="tweet"]"#.to_string(),
            text: r#"[data-testid="tweetText"]"#.to_string(),
            author: r#"[data-testid="User-Name"]"#.to_string(),
            time: "time[datetime]".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid selector {selector:?}: {reason}")]
pub struct InvalidSelector {
    pub selector: String,
    pub reason: String,
}

/// Reads reply units out of a DOM snapshot, in document order.
///
/// Within the author block, the first span starting with `@` is the handle
/// and the first other non-empty span is the display name.
#[derive(Debug)]
pub struct DomUnitParser {
    unit: Selector,
    text: Selector,
    author: Selector,
    time: Selector,
    span: Selector,
}

impl DomUnitParser {
    pub fn new(selectors: &UnitSelectors) -> Result<Self, InvalidSelector> {
        Ok(Self {
            unit: compile(&selectors.unit)?,
            text: compile(&selectors.text)?,
            author: compile(&selectors.author)?,
            time: compile(&selectors.time)?,
            span: compile("span")?,
        })
    }

    pub fn parse(&self, html: &str) -> Vec<RawUnit> {
        let doc = Html::parse_document(html);
        doc.select(&self.unit).map(|unit| self.read_unit(unit)).collect()
    }

    fn read_unit(&self, unit: ElementRef<'_>) -> RawUnit {
        let text = unit
            .select(&self.text)
            .next()
            .map(collect_text)
            .filter(|t| !t.trim().is_empty());

        let spans: Vec<String> = unit
            .select(&self.author)
            .next()
            .map(|author| {
                author
                    .select(&self.span)
                    .map(collect_text)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        let user_handle = spans.iter().find(|s| s.starts_with('@')).cloned();
        let user_name = spans.into_iter().find(|s| !s.starts_with('@'));

        let time = unit
            .select(&self.time)
            .next()
            .and_then(|t| t.value().attr("datetime"))
            .map(str::to_string);

        RawUnit {
            text,
            user_name,
            user_handle,
            time,
        }
    }
}

fn compile(selector: &str) -> Result<Selector, InvalidSelector> {
    Selector::parse(selector).map_err(|err| InvalidSelector {
        selector: selector.to_string(),
        reason: err.to_string(),
    })
}

fn collect_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}
