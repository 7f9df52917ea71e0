//! Data-driven lookup of the host page's controls.
//!
//! A [`Strategies`] table lists [`Locator`]s in priority order. Lookup walks
//! the list and takes the first control a locator yields; adding support for
//! new markup means adding entries, not code. The table can be replaced from
//! storage under [`keys::AUTOMATION_STRATEGIES`](selrelay_protocol::keys::AUTOMATION_STRATEGIES).

use serde::{Deserialize, Serialize};

use super::{Control, Page};

/// One way of finding a control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "camelCase")]
pub enum Locator {
	/// First element matching a CSS selector.
	Css(String),
	/// First `<button>` whose text contains the label.
	ButtonText(String),
	/// Last `<button>` in document order. Best effort only.
	LastButton,
}

impl Locator {
	pub fn css(selector: &str) -> Self {
		Locator::Css(selector.to_string())
	}

	pub fn button_text(label: &str) -> Self {
		Locator::ButtonText(label.to_string())
	}

	fn locate<P: Page>(&self, page: &P, accept: impl Fn(&P::Control) -> bool) -> Option<P::Control> {
		match self {
			Locator::Css(selector) => page.query_all(selector).into_iter().find(|c| accept(c)),
			Locator::ButtonText(label) => page
				.query_all("button")
				.into_iter()
				.find(|c| c.text().contains(label.as_str()) && accept(c)),
			Locator::LastButton => page.query_all("button").into_iter().filter(|c| accept(c)).last(),
		}
	}
}

/// Marks a control as secondary (voice input, attachments) so submit lookup
/// passes over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRule {
	pub attribute: String,
	/// Case-insensitive substring of the attribute value.
	pub contains: String,
}

impl SkipRule {
	pub fn new(attribute: &str, contains: &str) -> Self {
		Self {
			attribute: attribute.to_string(),
			contains: contains.to_string(),
		}
	}

	pub fn matches<C: Control>(&self, control: &C) -> bool {
		control
			.attribute(&self.attribute)
			.is_some_and(|value| value.to_lowercase().contains(&self.contains.to_lowercase()))
	}
}

/// Ordered locator tables for the target page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Strategies {
	pub input: Vec<Locator>,
	pub submit: Vec<Locator>,
	pub skip: Vec<SkipRule>,
	/// Selectors whose presence marks a page as an assistant page.
	pub probe_selectors: Vec<String>,
	/// Case-insensitive title/URL keywords marking an assistant page.
	pub target_keywords: Vec<String>,
}

impl Default for Strategies {
	fn default() -> Self {
		Self {
			input: vec![
				Locator::css(r#"textarea[data-id*="root"]"#),
				Locator::css("#prompt-textarea"),
				Locator::css("textarea"),
				Locator::css(r#"input[type="text"]"#),
				Locator::css(r#"[contenteditable="true"]"#),
			],
			submit: vec![
				Locator::css(r#"[data-testid="send-button"]"#),
				Locator::css(r#"[data-testid="submit-button"]"#),
				Locator::css(r#"button[type="submit"]"#),
				Locator::button_text("Send"),
				Locator::button_text("发送"),
				Locator::LastButton,
			],
			skip: vec![
				SkipRule::new("data-testid", "speech"),
				SkipRule::new("data-testid", "voice"),
				SkipRule::new("aria-label", "voice"),
				SkipRule::new("aria-label", "dictat"),
				SkipRule::new("aria-label", "语音"),
			],
			probe_selectors: vec![r#"textarea[data-id*="root"]"#.to_string(), "#prompt-textarea".to_string()],
			target_keywords: vec!["chatgpt".to_string(), "openai".to_string()],
		}
	}
}

impl Strategies {
	pub fn find_input<P: Page>(&self, page: &P) -> Option<P::Control> {
		self.input.iter().find_map(|locator| locator.locate(page, |_| true))
	}

	/// First submit candidate not matched by any [`SkipRule`].
	pub fn find_submit<P: Page>(&self, page: &P) -> Option<P::Control> {
		self.submit
			.iter()
			.find_map(|locator| locator.locate(page, |c| !self.is_skipped(c)))
	}

	pub fn is_skipped<C: Control>(&self, control: &C) -> bool {
		self.skip.iter().any(|rule| rule.matches(control))
	}

	/// Content heuristic for "this looks like the assistant page".
	pub fn looks_like_target<P: Page>(&self, page: &P) -> bool {
		if self.probe_selectors.iter().any(|s| page.query(s).is_some()) {
			return true;
		}
		let title = page.title().to_lowercase();
		let url = page.url().to_lowercase();
		self.target_keywords.iter().any(|keyword| {
			let keyword = keyword.to_lowercase();
			title.contains(&keyword) || url.contains(&keyword)
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{FakeControl, FakePage};

	#[test]
	fn input_lookup_follows_priority_order() {
		let page = FakePage::new();
		let generic = FakeControl::textarea();
		let specific = FakeControl::textarea().attr("id", "prompt-textarea");
		page.add(&["textarea"], &generic);
		page.add(&["#prompt-textarea", "textarea"], &specific);

		let found = Strategies::default().find_input(&page).unwrap();
		assert_eq!(found.attribute("id").as_deref(), Some("prompt-textarea"));
	}

	#[test]
	fn button_text_matches_either_language() {
		let page = FakePage::new();
		let other = FakeControl::button("Attach");
		let send = FakeControl::button("发送");
		page.add(&[], &send);
		page.add(&[], &other);

		let strategies = Strategies {
			submit: vec![Locator::button_text("Send"), Locator::button_text("发送")],
			..Strategies::default()
		};
		let found = strategies.find_submit(&page).unwrap();
		assert_eq!(found.text(), "发送");
	}

	#[test]
	fn skipped_controls_are_passed_over() {
		let page = FakePage::new();
		let voice = FakeControl::button("").attr("aria-label", "Start Voice mode");
		let send = FakeControl::button("").attr("data-testid", "send-button");
		page.add(&[r#"button[type="submit"]"#], &voice);
		page.add(&[r#"button[type="submit"]"#], &send);

		let found = Strategies::default().find_submit(&page).unwrap();
		assert_eq!(found.attribute("data-testid").as_deref(), Some("send-button"));
	}

	#[test]
	fn last_button_fallback_skips_secondary_controls() {
		let page = FakePage::new();
		let copy = FakeControl::button("Copy");
		let mic = FakeControl::button("").attr("data-testid", "composer-speech-button");
		page.add(&[], &copy);
		page.add(&[], &mic);

		let found = Strategies::default().find_submit(&page).unwrap();
		assert_eq!(found.text(), "Copy");
	}

	#[test]
	fn overrides_parse_from_stored_json() {
		let json = serde_json::json!({
			"input": [{ "by": "css", "value": "#composer" }],
			"submit": [{ "by": "buttonText", "value": "Go" }, { "by": "lastButton" }]
		});
		let strategies: Strategies = serde_json::from_value(json).unwrap();

		assert_eq!(strategies.input, vec![Locator::css("#composer")]);
		assert_eq!(strategies.submit, vec![Locator::button_text("Go"), Locator::LastButton]);
		assert_eq!(strategies.skip, Strategies::default().skip);
	}

	#[test]
	fn heuristic_uses_selectors_then_keywords() {
		let strategies = Strategies::default();

		let by_selector = FakePage::new();
		by_selector.add(&["#prompt-textarea"], &FakeControl::textarea());
		assert!(strategies.looks_like_target(&by_selector));

		let by_title = FakePage::titled("ChatGPT", "https://chatgpt.com/");
		assert!(strategies.looks_like_target(&by_title));

		let unrelated = FakePage::titled("Weather", "https://example.com/forecast");
		assert!(!strategies.looks_like_target(&unrelated));
	}
}
