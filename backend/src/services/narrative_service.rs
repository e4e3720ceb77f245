use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::{NarrativeInput, SummarySource};
use crate::services::llm_service::LlmProvider;
use crate::utils::format_number;

/// Produces the prose summary shown under the results.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    fn source(&self) -> SummarySource;

    async fn generate(&self, input: &NarrativeInput) -> Result<String, AppError>;
}

/// Narrative written by a text-generation model
pub struct LlmNarrativeGenerator {
    provider: Arc<dyn LlmProvider>,
}

impl LlmNarrativeGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl NarrativeGenerator for LlmNarrativeGenerator {
    fn source(&self) -> SummarySource {
        SummarySource::Llm
    }

    async fn generate(&self, input: &NarrativeInput) -> Result<String, AppError> {
        info!("Requesting LLM narrative for {}", input.ticker);
        let prompt = build_narrative_prompt(input);
        Ok(self.provider.generate_completion(prompt).await?)
    }
}

/// Rule-based narrative; used when no LLM key is configured and as the
/// fallback when the LLM call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateNarrativeGenerator;

#[async_trait]
impl NarrativeGenerator for TemplateNarrativeGenerator {
    fn source(&self) -> SummarySource {
        SummarySource::Template
    }

    async fn generate(&self, input: &NarrativeInput) -> Result<String, AppError> {
        let template = select_template(input.is_positive(), input.percent_return);
        info!("Rendering '{}' narrative template for {}", template.id(), input.ticker);
        Ok(render_template(template, input, Utc::now()))
    }
}

fn build_narrative_prompt(input: &NarrativeInput) -> String {
    format!(
        r#"Generate a concise investment analysis for the following stock investment:

- Ticker: {}
- Company: {}
- Purchase Date: {}
- Initial Investment: ${}
- Current Value: ${}
- Gain/Loss: ${} ({:.2}%)

Please include:
1. An assessment of the investment performance
2. Context about the company or industry that might explain the performance
3. A brief comparison to market averages
4. A forward-looking statement about potential future performance

Keep the tone professional but conversational. Limit to 3-4 paragraphs."#,
        input.ticker,
        input.company_name,
        input.purchase_date.format("%Y-%m-%d"),
        format_number(input.amount, 2),
        format_number(input.current_value, 2),
        format_number(input.gain_loss, 2),
        input.percent_return,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeTemplate {
    Exceptional,
    Solid,
    ModestGrowth,
    SlightDecline,
    SignificantDecline,
}

impl NarrativeTemplate {
    pub fn id(&self) -> &'static str {
        match self {
            NarrativeTemplate::Exceptional => "exceptional",
            NarrativeTemplate::Solid => "solid",
            NarrativeTemplate::ModestGrowth => "modest_growth",
            NarrativeTemplate::SlightDecline => "slight_decline",
            NarrativeTemplate::SignificantDecline => "significant_decline",
        }
    }
}

struct NarrativeRule {
    template: NarrativeTemplate,
    applies: fn(bool, f64) -> bool,
}

// Evaluated top-down, first match wins. The last rule matches everything.
const NARRATIVE_RULES: [NarrativeRule; 5] = [
    NarrativeRule {
        template: NarrativeTemplate::Exceptional,
        applies: |is_positive, pct| is_positive && pct > 100.0,
    },
    NarrativeRule {
        template: NarrativeTemplate::Solid,
        applies: |is_positive, pct| is_positive && pct > 20.0,
    },
    NarrativeRule {
        template: NarrativeTemplate::ModestGrowth,
        applies: |is_positive, _| is_positive,
    },
    NarrativeRule {
        template: NarrativeTemplate::SlightDecline,
        applies: |_, pct| pct > -20.0,
    },
    NarrativeRule {
        template: NarrativeTemplate::SignificantDecline,
        applies: |_, _| true,
    },
];

pub fn select_template(is_positive: bool, percent_return: f64) -> NarrativeTemplate {
    NARRATIVE_RULES
        .iter()
        .find(|rule| (rule.applies)(is_positive, percent_return))
        .map(|rule| rule.template)
        .unwrap_or(NarrativeTemplate::SignificantDecline)
}

pub fn format_purchase_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// "7 months" under a year, "3.4 years" otherwise.
pub fn elapsed_text(purchase_date: NaiveDate, now: DateTime<Utc>) -> String {
    let start = purchase_date.and_time(NaiveTime::MIN).and_utc();
    let days = (now - start).num_milliseconds().max(0) as f64 / 86_400_000.0;
    let years = days / 365.0;

    if years < 1.0 {
        format!("{} months", (years * 12.0).round() as i64)
    } else {
        format!("{:.1} years", years)
    }
}

pub fn render_template(
    template: NarrativeTemplate,
    input: &NarrativeInput,
    now: DateTime<Utc>,
) -> String {
    let opening = |verb: &str| {
        format!(
            "Your investment of ${} in {} ({}) on {} {} over the past {}. It's now worth ${}",
            format_number(input.amount, 3),
            input.company_name,
            input.ticker.to_uppercase(),
            format_purchase_date(input.purchase_date),
            verb,
            elapsed_text(input.purchase_date, now),
            format_number(input.current_value, 2),
        )
    };
    let company = &input.company_name;
    let pct = input.percent_return;
    let abs_pct = pct.abs();

    match template {
        NarrativeTemplate::Exceptional => format!(
            "{}, representing a remarkable gain of {:.2}%.\n\n\
             This outstanding return significantly outperforms the average market return of about 10% annually. \
             If you had invested the same amount in an S&P 500 index fund, your investment would likely be worth considerably less. \
             {} has demonstrated strong growth potential, likely due to successful product launches, market expansion, or industry leadership.",
            opening("has performed exceptionally well"),
            pct,
            company,
        ),
        NarrativeTemplate::Solid => format!(
            "{}, representing a solid gain of {:.2}%.\n\n\
             This return is in line with healthy market performance. \
             {} has shown steady growth, maintaining its competitive position in the market. \
             The company has likely executed its business strategy effectively, resulting in consistent value creation for shareholders.",
            opening("has performed well"),
            pct,
            company,
        ),
        NarrativeTemplate::ModestGrowth => format!(
            "{}, representing a gain of {:.2}%.\n\n\
             While this return is positive, it's worth noting that it may be lower than what you might have achieved with some alternative investments. \
             {} has maintained relatively stable performance, which could indicate a mature company in a competitive market or one that's navigating industry challenges.",
            opening("has shown modest growth"),
            pct,
            company,
        ),
        NarrativeTemplate::SlightDecline => format!(
            "{}, representing a loss of {:.2}%.\n\n\
             This performance is below market averages, but moderate losses are not uncommon in equity investments, especially in shorter time frames. \
             {} may be facing temporary challenges or operating in a sector experiencing headwinds. \
             Remember that stock investments typically perform better over longer time horizons.",
            opening("has experienced a slight decline"),
            abs_pct,
            company,
        ),
        NarrativeTemplate::SignificantDecline => format!(
            "{}, representing a substantial loss of {:.2}%.\n\n\
             This performance indicates that {} has faced serious challenges, which could include industry disruption, competitive pressures, or internal management issues. \
             While disappointing, it's important to remember that individual stock investments carry higher risk than diversified portfolios. \
             This outcome highlights the importance of diversification across multiple assets and sectors.",
            opening("has unfortunately declined significantly"),
            abs_pct,
            company,
        ),
    }
}

/// Single-sentence summary used when even the template path fails.
pub fn brief_summary(input: &NarrativeInput) -> String {
    let name = if input.company_name.trim().is_empty() {
        input.ticker.to_uppercase()
    } else {
        input.company_name.clone()
    };
    let (direction, closing) = if input.is_positive() {
        ("gain", "Congratulations on your successful investment!")
    } else {
        (
            "loss",
            "While this investment hasn't performed as hoped, remember that markets fluctuate over time.",
        )
    };

    format!(
        "Your investment of ${} in {} on {} is now worth ${}, representing a {} of {:.2}%. {}",
        format_number(input.amount, 3),
        name,
        format_purchase_date(input.purchase_date),
        format_number(input.current_value, 2),
        direction,
        input.percent_return.abs(),
        closing,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn input(amount: f64, current_value: f64) -> NarrativeInput {
        let gain_loss = current_value - amount;
        NarrativeInput {
            ticker: "aapl".to_string(),
            company_name: "Apple Inc.".to_string(),
            purchase_date: NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
            amount,
            current_value,
            gain_loss,
            percent_return: gain_loss / amount * 100.0,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(select_template(true, 200.0), NarrativeTemplate::Exceptional);
        assert_eq!(select_template(true, 100.0), NarrativeTemplate::Solid);
        assert_eq!(select_template(true, 20.5), NarrativeTemplate::Solid);
        assert_eq!(select_template(true, 20.0), NarrativeTemplate::ModestGrowth);
        assert_eq!(select_template(true, 0.0), NarrativeTemplate::ModestGrowth);
        assert_eq!(select_template(false, -0.1), NarrativeTemplate::SlightDecline);
        assert_eq!(select_template(false, -20.0), NarrativeTemplate::SignificantDecline);
        assert_eq!(select_template(false, -30.0), NarrativeTemplate::SignificantDecline);
    }

    #[test]
    fn test_sign_flag_wins_over_percent() {
        // a positive percent with is_positive unset never reaches the gain templates
        assert_eq!(select_template(false, 150.0), NarrativeTemplate::SlightDecline);
    }

    #[test]
    fn test_selection_is_deterministic() {
        for &(flag, pct) in &[(true, 150.0), (true, 5.0), (false, -5.0), (false, -80.0), (false, f64::NAN)] {
            assert_eq!(select_template(flag, pct), select_template(flag, pct));
        }
        assert_eq!(select_template(false, f64::NAN), NarrativeTemplate::SignificantDecline);
    }

    #[test]
    fn test_template_ids() {
        assert_eq!(NarrativeTemplate::ModestGrowth.id(), "modest_growth");
        assert_eq!(
            serde_json::to_value(NarrativeTemplate::SignificantDecline).unwrap(),
            "significant_decline"
        );
    }

    #[test]
    fn test_elapsed_text() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(elapsed_text(date, now()), "5 months");

        let date = NaiveDate::from_ymd_opt(2020, 1, 15).unwrap();
        assert_eq!(elapsed_text(date, now()), "4.4 years");

        let future = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(elapsed_text(future, now()), "0 months");
    }

    #[test]
    fn test_render_exceptional() {
        let text = render_template(NarrativeTemplate::Exceptional, &input(1000.0, 3000.0), now());

        assert!(text.starts_with(
            "Your investment of $1,000 in Apple Inc. (AAPL) on January 15, 2020 has performed exceptionally well over the past 4.4 years."
        ));
        assert!(text.contains("worth $3,000, representing a remarkable gain of 200.00%."));
    }

    #[test]
    fn test_render_decline_uses_absolute_percent() {
        let text = render_template(NarrativeTemplate::SignificantDecline, &input(1000.0, 700.0), now());
        assert!(text.contains("substantial loss of 30.00%"));
        assert!(!text.contains("-30"));
        assert!(text.contains(
            "While disappointing, it's important to remember that individual stock investments carry higher risk than diversified portfolios. \
             This outcome highlights the importance of diversification across multiple assets and sectors."
        ));
    }

    #[test]
    fn test_render_moderate_templates_wording() {
        let text = render_template(NarrativeTemplate::ModestGrowth, &input(1000.0, 1100.0), now());
        assert!(text.contains(
            "While this return is positive, it's worth noting that it may be lower than what you might have achieved"
        ));

        let text = render_template(NarrativeTemplate::SlightDecline, &input(1000.0, 900.0), now());
        assert!(text.contains("especially in shorter time frames."));
        assert!(text.ends_with("Remember that stock investments typically perform better over longer time horizons."));
    }

    #[tokio::test]
    async fn test_template_generator_selects_by_metrics() {
        let generator = TemplateNarrativeGenerator;
        let text = generator.generate(&input(1000.0, 1100.0)).await.unwrap();
        assert!(text.contains("modest growth"));
        assert_eq!(generator.source(), SummarySource::Template);
    }

    #[test]
    fn test_brief_summary() {
        let text = brief_summary(&input(1000.0, 700.0));
        assert_eq!(
            text,
            "Your investment of $1,000 in Apple Inc. on January 15, 2020 is now worth $700, \
             representing a loss of 30.00%. While this investment hasn't performed as hoped, \
             remember that markets fluctuate over time."
        );

        let mut nameless = input(1000.0, 1500.0);
        nameless.company_name = String::new();
        let text = brief_summary(&nameless);
        assert!(text.contains("in AAPL on"));
        assert!(text.contains("gain of 50.00%"));
    }

    #[test]
    fn test_prompt_embeds_all_inputs() {
        let prompt = build_narrative_prompt(&input(1000.0, 1250.0));
        assert!(prompt.contains("- Ticker: aapl"));
        assert!(prompt.contains("- Company: Apple Inc."));
        assert!(prompt.contains("- Purchase Date: 2020-01-15"));
        assert!(prompt.contains("- Initial Investment: $1,000"));
        assert!(prompt.contains("- Current Value: $1,250"));
        assert!(prompt.contains("- Gain/Loss: $250 (25.00%)"));
        assert!(prompt.contains("3-4 paragraphs"));
    }
}
