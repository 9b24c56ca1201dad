use std::fmt::Write;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use spendlens_analysis::analyzer::{Analysis, CategoryRollup};
use spendlens_analysis::report::{money, signed_money};
use spendlens_core::{Account, Category, Transaction};

use crate::baseline::Baseline;

/// Rows at least this old at training time form the historical baseline.
const BASELINE_WINDOW_DAYS: i64 = 30;
/// A category is "growing" when its current total exceeds its historical
/// total by more than this percentage.
const GROWTH_ALERT_PCT: i64 = 10;

// ── query routing ──
// First matching set wins; a query naming both a category and "forecast"
// is a category question.
const BUDGET_WORDS: &[&str] =
    &["budget", "summary", "overview", "how much", "total", "spending overview", "overall"];
const CATEGORY_WORDS: &[&str] = &[
    "category", "categories", "food", "dining", "housing", "transport", "shop", "health",
    "entertain", "subscription", "utilities", "transfer", "income",
];
const PROJECTION_WORDS: &[&str] = &[
    "increase", "project", "forecast", "future", "predict", "next month", "trend", "growing",
    "rising",
];
const ACCOUNT_WORDS: &[&str] =
    &["account", "add account", "new account", "bank", "institution", "link", "connect"];
const SAVINGS_WORDS: &[&str] =
    &["save", "saving", "reduce", "cut", "tip", "advice", "suggest", "recommend"];
const MERCHANT_WORDS: &[&str] = &["merchant", "vendor", "store", "where", "top spend"];
const COMPARISON_WORDS: &[&str] =
    &["compare", "vs", "versus", "historical", "last month", "previous"];
const INVESTMENT_WORDS: &[&str] = &[
    "invest", "retirement", "401k", "roth", "ira", "529", "college", "portfolio", "stock",
    "bond", "fund",
];
const SECURITY_WORDS: &[&str] = &[
    "secure", "security", "share", "sharing", "2fa", "two-factor", "encrypt", "protection",
    "privacy",
];
const GREETING_WORDS: &[&str] = &["hello", "hi", "hey", "help", "what can you"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResponseKind {
    Greeting,
    Analysis,
    Projection,
    Guide,
    Tips,
    Security,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub text: String,
    pub kind: ResponseKind,
}

impl Response {
    fn new(text: impl Into<String>, kind: ResponseKind) -> Self {
        Response { text: text.into(), kind }
    }
}

/// Derived spending patterns kept alongside the baseline for quick reuse
/// across handlers.
#[derive(Debug, Clone, Default)]
struct Patterns {
    top_category: Option<CategoryRollup>,
    avg_txn_size: Decimal,
}

impl Patterns {
    fn build(transactions: &[Transaction], analysis: &Analysis) -> Self {
        let top_category = analysis
            .categories
            .iter()
            .find(|c| c.category != Category::Income)
            .cloned();

        let expenses: Vec<Decimal> = transactions
            .iter()
            .filter(|t| t.amount < Decimal::ZERO)
            .map(|t| t.amount.abs())
            .collect();
        let avg_txn_size = if expenses.is_empty() {
            Decimal::ZERO
        } else {
            expenses.iter().sum::<Decimal>() / Decimal::from(expenses.len() as i64)
        };

        Patterns { top_category, avg_txn_size }
    }
}

/// Keyword-routed response engine over a trained snapshot. Holds the full
/// transaction set, its analysis, the derived accounts, and a historical
/// baseline split at a 30-day boundary.
pub struct Engine {
    transactions: Vec<Transaction>,
    analysis: Analysis,
    accounts: Vec<Account>,
    baseline: Baseline,
    patterns: Patterns,
}

impl Engine {
    /// Train on a transaction set. `today` anchors the current-period
    /// boundary so callers (and tests) control what counts as historical.
    pub fn train(
        transactions: Vec<Transaction>,
        analysis: Analysis,
        accounts: Vec<Account>,
        today: NaiveDate,
    ) -> Self {
        let boundary = today - Duration::days(BASELINE_WINDOW_DAYS);
        let baseline = Baseline::build(
            transactions.iter().filter(|t| t.date.is_some_and(|d| d < boundary)),
        );
        tracing::debug!(
            total = transactions.len(),
            historical = baseline.count,
            "trained assistant engine"
        );
        let patterns = Patterns::build(&transactions, &analysis);
        Engine { transactions, analysis, accounts, baseline, patterns }
    }

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    /// Route a query to the best handler. Matching is ordered and first
    /// match wins, so broader sets sit later in the chain.
    pub fn respond(&self, query: &str) -> Response {
        let q = query.to_lowercase();
        let q = q.trim();

        if matches_any(q, BUDGET_WORDS) {
            return self.budget_summary();
        }
        if matches_any(q, CATEGORY_WORDS) {
            return self.category_analysis(q);
        }
        if matches_any(q, PROJECTION_WORDS) {
            return self.projections();
        }
        if matches_any(q, ACCOUNT_WORDS) {
            return self.account_guidance();
        }
        if matches_any(q, SAVINGS_WORDS) {
            return self.savings_tips();
        }
        if matches_any(q, MERCHANT_WORDS) {
            return self.merchant_analysis();
        }
        if matches_any(q, COMPARISON_WORDS) {
            return self.historical_comparison();
        }
        if matches_any(q, INVESTMENT_WORDS) {
            return self.investment_advice(q);
        }
        if matches_any(q, SECURITY_WORDS) {
            return self.security_info(q);
        }
        if matches_any(q, GREETING_WORDS) {
            return self.greeting();
        }
        self.general_response()
    }

    fn has_data(&self) -> bool {
        self.analysis.transaction_count > 0
    }

    /// Distinct trend days, defaulting to a month when the trend is empty.
    fn period_days(&self) -> Decimal {
        let days = self.analysis.daily_trend.len();
        Decimal::from(if days == 0 { 30 } else { days as i64 })
    }

    fn expense_categories(&self) -> impl Iterator<Item = &CategoryRollup> {
        self.analysis.categories.iter().filter(|c| c.category != Category::Income)
    }

    fn greeting(&self) -> Response {
        let text = "Hi! I'm your SpendLens assistant. I've analyzed your financial data \
                    and I'm ready to help.\n\n\
                    Here's what I can do:\n\
                    - **Budget summaries** — \"How much did I spend?\"\n\
                    - **Category analysis** — \"Break down my food spending\"\n\
                    - **Future projections** — \"What will next month look like?\"\n\
                    - **Account guidance** — \"How do I add a new account?\"\n\
                    - **Savings tips** — \"Where can I save money?\"\n\
                    - **Investment basics** — \"Tell me about Roth IRAs\"\n\
                    - **Security** — \"How is my data protected?\"\n\n\
                    Just ask me anything about your finances.";
        Response::new(text, ResponseKind::Greeting)
    }

    fn budget_summary(&self) -> Response {
        if !self.has_data() {
            return Response::new(
                "Please import your financial data first so I can analyze it.",
                ResponseKind::Info,
            );
        }
        let a = &self.analysis;
        let daily_avg = a.total_spend / self.period_days();

        let mut out = String::from("## Budget Summary\n\n");
        let _ = writeln!(out, "**Total Spending:** {}", money(a.total_spend));
        let _ = writeln!(out, "**Total Income:** {}", money(a.total_income));
        let flag = if a.net_flow >= Decimal::ZERO { "" } else { " (!)" };
        let _ = writeln!(out, "**Net Cash Flow:** {}{flag}", signed_money(a.net_flow));
        let _ = writeln!(out, "**Daily Average:** {}/day", money(daily_avg));
        let _ = writeln!(
            out,
            "**Average Expense:** {}/transaction",
            money(self.patterns.avg_txn_size)
        );

        let _ = writeln!(out, "\n### Top Spending Categories");
        for (i, c) in self.expense_categories().take(3).enumerate() {
            let _ = writeln!(
                out,
                "{}. **{}** — {} ({:.1}%)",
                i + 1,
                c.category.name(),
                money(c.abs_total),
                pct(c.abs_total, a.total_spend)
            );
        }
        let _ = write!(
            out,
            "\n**{}** transactions across **{}** accounts.",
            a.transaction_count,
            a.institutions.len()
        );

        if a.net_flow < Decimal::ZERO {
            let top = self
                .patterns
                .top_category
                .as_ref()
                .map_or("top", |c| c.category.name());
            let _ = write!(
                out,
                "\n\nYou're spending more than you're earning this period. \
                 Consider reviewing your {top} expenses."
            );
        }

        Response::new(out, ResponseKind::Analysis)
    }

    fn category_analysis(&self, q: &str) -> Response {
        if !self.has_data() {
            return Response::new(
                "No data loaded yet. Import a CSV or PDF statement first.",
                ResponseKind::Info,
            );
        }
        let a = &self.analysis;

        if let Some(c) =
            a.categories.iter().find(|c| q.contains(&c.category.name().to_lowercase()))
        {
            let mut out = String::new();
            let _ = writeln!(out, "## {} {}\n", c.category.icon(), c.category.name());
            let _ = writeln!(
                out,
                "**Total:** {} ({:.1}% of spending)",
                money(c.abs_total),
                pct(c.abs_total, a.total_spend)
            );
            let _ = writeln!(out, "**Transactions:** {}", c.count);
            let _ = writeln!(out, "**Average:** {}/transaction", money(c.avg.abs()));

            if !c.merchants.is_empty() {
                let _ = writeln!(out, "\n### Top Merchants");
                for m in c.merchants.iter().take(3) {
                    let _ = writeln!(out, "- **{}** — {} ({}x)", m.name, money(m.total), m.count);
                }
            }

            if let Some(hist) = self
                .baseline
                .has_data()
                .then(|| self.baseline.categories.get(&c.category))
                .flatten()
            {
                let diff = c.abs_total - hist.total;
                let _ = writeln!(out, "\n### vs Historical");
                let direction = if diff > Decimal::ZERO { "Up" } else { "Down" };
                if hist.total > Decimal::ZERO {
                    let _ = write!(
                        out,
                        "{direction} **{}** ({:.1}%) from prior periods",
                        money(diff.abs()),
                        pct(diff, hist.total)
                    );
                } else {
                    let _ = write!(out, "{direction} **{}** from prior periods", money(diff.abs()));
                }
            }

            return Response::new(out, ResponseKind::Analysis);
        }

        let mut out = String::from("## All Categories\n\n");
        for c in &a.categories {
            let _ = writeln!(
                out,
                "{} **{}** — {} ({} txns)",
                c.category.icon(),
                c.category.name(),
                money(c.abs_total),
                c.count
            );
        }
        let _ = write!(out, "\nAsk about a specific category for a detailed breakdown.");
        Response::new(out, ResponseKind::Analysis)
    }

    fn projections(&self) -> Response {
        if !self.has_data() {
            return Response::new("Import data first to get projections.", ResponseKind::Info);
        }
        let a = &self.analysis;
        let daily_rate = a.total_spend / self.period_days();
        let projected_30 = daily_rate * Decimal::from(30);
        let projected_net = a.total_income - projected_30;

        let mut out = String::from("## Financial Projections\n\n");
        let _ = writeln!(out, "**Current daily rate:** {}/day", money(daily_rate));
        let _ = writeln!(out, "**Projected 30-day spend:** {}", money(projected_30));
        let _ = writeln!(out, "**Projected monthly income:** {}", money(a.total_income));
        let flag = if projected_net >= Decimal::ZERO { "" } else { " (!)" };
        let _ = writeln!(out, "**Projected net flow:** {}{flag}", signed_money(projected_net));

        let growing = self.growing_categories();
        if !growing.is_empty() {
            let _ = writeln!(out, "\n### Growing Categories");
            for (category, change, current) in growing {
                let _ = writeln!(
                    out,
                    "- **{}** is up **{change:.0}%** — currently {}",
                    category.name(),
                    money(current)
                );
            }
        }

        let trend = &a.daily_trend;
        if trend.len() >= 7 {
            let seven = Decimal::from(7);
            let recent: Decimal =
                trend[trend.len() - 7..].iter().map(|d| d.spend).sum::<Decimal>() / seven;
            let earlier: Decimal = trend[..7].iter().map(|d| d.spend).sum::<Decimal>() / seven;
            if earlier > Decimal::ZERO {
                let velocity = pct(recent - earlier, earlier);
                let _ = writeln!(out, "\n### Spending Velocity");
                if velocity > Decimal::ZERO {
                    let _ = write!(
                        out,
                        "Your recent spending rate is **{velocity:.0}% higher** than the \
                         start of the period. Consider tightening your budget."
                    );
                } else {
                    let _ = write!(
                        out,
                        "Your recent spending rate is **{:.0}% lower** than the start of \
                         the period. Great trend!",
                        velocity.abs()
                    );
                }
            }
        }

        Response::new(out, ResponseKind::Projection)
    }

    /// Current categories whose totals exceed their historical totals by more
    /// than the alert threshold, steepest growth first.
    fn growing_categories(&self) -> Vec<(Category, Decimal, Decimal)> {
        if !self.baseline.has_data() {
            return Vec::new();
        }
        let mut growing: Vec<(Category, Decimal, Decimal)> = self
            .expense_categories()
            .filter_map(|c| {
                let hist = self.baseline.categories.get(&c.category)?;
                if hist.total <= Decimal::ZERO {
                    return None;
                }
                let change = pct(c.abs_total - hist.total, hist.total);
                (change > Decimal::from(GROWTH_ALERT_PCT))
                    .then_some((c.category, change, c.abs_total))
            })
            .collect();
        growing.sort_by(|a, b| b.1.cmp(&a.1));
        growing
    }

    fn account_guidance(&self) -> Response {
        let mut out = String::from("## Account Management\n\n### Currently Linked Accounts\n");
        if self.accounts.is_empty() {
            let _ = writeln!(out, "- none yet");
        }
        for a in &self.accounts {
            let _ = writeln!(out, "- **{}** ({}) — {} transactions", a.name, a.kind, a.txn_count);
        }

        out.push_str(
            "\n### How to Add New Accounts\n\
             1. Export a statement from your bank as CSV or PDF\n\
             2. Run `spendlens analyze <statement-file>` to import it\n\
             3. Transactions are grouped by the statement's institution column\n\n\
             ### Supported Formats\n\
             - **CSV** — most bank exports; headers are matched flexibly\n\
             - **PDF** — text-based bank statements\n\n\
             Tip: include the institution/account column in your export so \
             transactions are properly grouped by account.",
        );
        Response::new(out, ResponseKind::Guide)
    }

    fn savings_tips(&self) -> Response {
        if !self.has_data() {
            return Response::new(
                "Import your data first for personalized savings tips.",
                ResponseKind::Info,
            );
        }
        let a = &self.analysis;
        const DISCRETIONARY: &[Category] = &[
            Category::FoodDining,
            Category::Shopping,
            Category::Entertainment,
            Category::Subscriptions,
        ];
        let discretionary: Vec<&CategoryRollup> = self
            .expense_categories()
            .filter(|c| DISCRETIONARY.contains(&c.category))
            .collect();
        let total: Decimal = discretionary.iter().map(|c| c.abs_total).sum();

        let mut out = String::from("## Personalized Savings Tips\n\n");
        let _ = writeln!(
            out,
            "**Discretionary spending:** {} ({:.0}% of total)\n",
            money(total),
            pct(total, a.total_spend)
        );

        for c in &discretionary {
            let _ = writeln!(
                out,
                "### {} {} — {}",
                c.category.icon(),
                c.category.name(),
                money(c.abs_total)
            );
            match c.category {
                Category::FoodDining => {
                    let _ = writeln!(
                        out,
                        "- Consider meal prepping — could save up to 30% (~{})",
                        money(c.abs_total * Decimal::new(3, 1))
                    );
                    let _ = writeln!(out, "- Reduce delivery orders");
                }
                Category::Shopping => {
                    let _ = writeln!(out, "- Try a 24-hour rule before non-essential purchases");
                    let _ = writeln!(out, "- Check for duplicate or impulse purchases");
                }
                Category::Entertainment => {
                    let _ = writeln!(out, "- Look for free alternatives and discount days");
                }
                Category::Subscriptions => {
                    let _ = writeln!(out, "- Audit each subscription; cancel the unused ones");
                    let _ = writeln!(out, "- Consider annual plans for savings");
                }
                _ => {}
            }
            out.push('\n');
        }

        let _ = writeln!(
            out,
            "**Potential monthly savings:** ~{} by reducing discretionary spending by 20%",
            money(total * Decimal::new(2, 1))
        );
        let _ = write!(
            out,
            "\nConsider investing these savings. Ask me \"How can I invest?\" for details."
        );
        Response::new(out, ResponseKind::Tips)
    }

    fn merchant_analysis(&self) -> Response {
        if !self.has_data() {
            return Response::new("Load your data to see merchant insights.", ResponseKind::Info);
        }
        let a = &self.analysis;

        let mut out = String::from("## Top Merchants\n\n");
        for (i, m) in a.top_merchants.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. **{}** — {} ({} transactions)",
                i + 1,
                m.name,
                money(m.total),
                m.count
            );
        }

        let _ = writeln!(out, "\n### By Institution");
        for inst in a.institutions.iter().take(4) {
            let _ = writeln!(out, "\n**{}:**", inst.name);
            let members: Vec<&Transaction> = self
                .transactions
                .iter()
                .filter(|t| t.institution == inst.name && t.amount < Decimal::ZERO)
                .collect();
            for m in spendlens_analysis::analyzer::top_merchants(members.iter().copied(), 3) {
                let _ = writeln!(out, "  - {}: {}", m.name, money(m.total));
            }
        }

        Response::new(out, ResponseKind::Analysis)
    }

    fn historical_comparison(&self) -> Response {
        if !self.has_data() {
            return Response::new("Import data first.", ResponseKind::Info);
        }
        if !self.baseline.has_data() {
            return Response::new(
                "No historical data available yet. Import data spanning more than 30 days \
                 for comparisons.",
                ResponseKind::Info,
            );
        }
        let a = &self.analysis;
        let b = &self.baseline;

        let mut out = String::from("## Current vs Historical\n\n");
        let _ = writeln!(out, "| Metric | Current Period | Historical |");
        let _ = writeln!(out, "|--------|---------------|------------|");
        let _ = writeln!(out, "| Total Spend | {} | {} |", money(a.total_spend), money(b.total_spend));
        let _ = writeln!(out, "| Total Income | {} | {} |", money(a.total_income), money(b.total_income));
        let _ = writeln!(out, "| Transactions | {} | {} |", a.transaction_count, b.count);

        let _ = writeln!(out, "\n### Category Changes");
        for c in self.expense_categories() {
            match b.categories.get(&c.category) {
                Some(hist) => {
                    let diff = c.abs_total - hist.total;
                    let arrow = if diff > Decimal::ZERO {
                        "up"
                    } else if diff < Decimal::ZERO {
                        "down"
                    } else {
                        "flat"
                    };
                    let _ = writeln!(
                        out,
                        "- **{}**: {} (was {}, {arrow})",
                        c.category.name(),
                        money(c.abs_total),
                        money(hist.total)
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "- **{}**: {} (new)",
                        c.category.name(),
                        money(c.abs_total)
                    );
                }
            }
        }

        Response::new(out, ResponseKind::Analysis)
    }

    fn investment_advice(&self, q: &str) -> Response {
        let mut out = String::from("## Investment Basics\n\n");

        if q.contains("529") || q.contains("college") || q.contains("education") {
            out.push_str(
                "### 529 Education Savings Plans\n\
                 A tax-advantaged savings plan for future education costs.\n\n\
                 **Key Benefits:**\n\
                 - **Tax-free growth:** earnings grow federal tax-free\n\
                 - **Tax-free withdrawals** for qualified education expenses\n\
                 - **State tax breaks:** many states offer deductions for contributions\n\
                 - **Flexibility:** usable for K-12 tuition and student loan repayments",
            );
        } else if q.contains("roth") || q.contains("ira") {
            out.push_str(
                "### Roth IRA\n\
                 An individual retirement account with tax-free growth and tax-free \
                 withdrawals in retirement.\n\n\
                 **Key Benefits:**\n\
                 - **Tax-free withdrawals:** taxed on contributions now, not later\n\
                 - **Flexibility:** contributions (not earnings) can be withdrawn any time\n\
                 - **No required minimum distributions** during your lifetime\n\n\
                 Best for those who expect a higher tax bracket in retirement.",
            );
        } else if q.contains("401") || q.contains("employer") || q.contains("match") {
            out.push_str(
                "### 401(k) Plans\n\
                 An employer-sponsored retirement plan, often with matching contributions.\n\n\
                 **Key Benefits:**\n\
                 - **Employer match:** always contribute enough to get the full match\n\
                 - **Tax advantages:** traditional contributions lower taxable income now\n\
                 - **High contribution limits** plus catch-up contributions at 50+\n\n\
                 Strategy: prioritize the 401(k) match before other investments.",
            );
        } else {
            out.push_str(
                "Building wealth starts with a plan. Three accounts to consider:\n\n\
                 1. **401(k):** priority #1 if your employer offers a match\n\
                 2. **Roth IRA:** tax-free growth with withdrawal flexibility\n\
                 3. **529 Plan:** tax-advantaged savings for education costs\n",
            );
            if self.has_data() && self.analysis.net_flow > Decimal::ZERO {
                let _ = write!(
                    out,
                    "\nBased on your current net flow of **{}**, you have surplus cash \
                     to start investing.\n",
                    money(self.analysis.net_flow)
                );
            }
            out.push_str("\nAsk about \"Roth IRA\", \"401k\", or \"529 plans\" for details.");
        }

        Response::new(out, ResponseKind::Guide)
    }

    fn security_info(&self, q: &str) -> Response {
        let mut out = String::from("## Security & Data Handling\n\n");
        if q.contains("share") || q.contains("sharing") {
            out.push_str(
                "### Sharing Your Data\n\
                 SpendLens never uploads your statements anywhere. To share an analysis, \
                 export it with `spendlens analyze --json` and send the file yourself; \
                 you stay in control of who sees it.",
            );
        } else {
            out.push_str(
                "### Data Protection\n\
                 - **Local processing:** statements are parsed on your machine and \
                   never leave it\n\
                 - **No credentials:** SpendLens reads exported files only and never \
                   connects to your bank\n\
                 - **No telemetry:** your financial data is yours",
            );
        }
        Response::new(out, ResponseKind::Security)
    }

    fn general_response(&self) -> Response {
        if !self.has_data() {
            return Response::new(
                "I'm your financial assistant. Import a CSV or PDF statement to get \
                 started. I can help with budget summaries, category analysis, spending \
                 projections, and more.",
                ResponseKind::Info,
            );
        }
        let a = &self.analysis;
        let top = self
            .patterns
            .top_category
            .as_ref()
            .map_or("N/A", |c| c.category.name());

        let mut out =
            String::from("I'm not sure I fully understand that, but here's a quick snapshot:\n\n");
        let _ = writeln!(out, "- **Total Spend:** {}", money(a.total_spend));
        let _ = writeln!(out, "- **Total Income:** {}", money(a.total_income));
        let _ = writeln!(out, "- **Accounts:** {}", a.institutions.len());
        let _ = writeln!(out, "- **Top Category:** {top}");
        out.push_str(
            "\nTry asking:\n\
             - \"Give me a budget summary\"\n\
             - \"How much did I spend on food?\"\n\
             - \"What will my spending look like next month?\"\n\
             - \"How do I add a new account?\"",
        );
        Response::new(out, ResponseKind::Info)
    }
}

fn matches_any(q: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| q.contains(kw))
}

/// part / whole × 100, zero when the denominator is zero.
fn pct(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * Decimal::ONE_HUNDRED
    }
}
