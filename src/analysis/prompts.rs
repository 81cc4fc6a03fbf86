//! Agent personas, prompt templates and the fixed fallback texts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::analysis::inputs::LifeInputs;
use crate::analysis::reflection::WeekData;

/// Role, goal and background sent as an agent's system preamble.
#[derive(Debug, Clone, Copy)]
pub struct Persona {
    /// Short agent label shown on insight cards.
    pub agent: &'static str,
    pub role: &'static str,
    pub goal: &'static str,
    pub background: &'static str,
}

impl Persona {
    pub fn preamble(&self) -> String {
        format!(
            "You are the {}.\n\nGoal: {}\n\nBackground: {}",
            self.role, self.goal, self.background
        )
    }
}

pub const HEALTH_PERSONA: Persona = Persona {
    agent: "Health",
    role: "Health and Wellness Officer",
    goal: "Improve the user's physical and mental health through stress management, \
           better sleep, regular movement and sensible nutrition. Produce concrete, \
           safe actions the user can start today.",
    background: "You are a preventive-care physician who has spent two decades turning \
                 everyday health data into small, sustainable habits.",
};

pub const FINANCE_PERSONA: Persona = Persona {
    agent: "Finance",
    role: "Personal Finance Director",
    goal: "Balance the user's budget, cut waste, protect upcoming bills and build savings \
           while leaving room for health and study spending.",
    background: "You are a former analyst who now automates household budgets so people \
                 can stop worrying about money and focus on their goals.",
};

pub const STUDY_PERSONA: Persona = Persona {
    agent: "Study",
    role: "Learning Performance Coach",
    goal: "Design a realistic study schedule using spaced repetition, focused work blocks \
           and deliberate breaks so the user is ready for the exam without burning out.",
    background: "You research how students learn under pressure and favour the minimum \
                 effective dose of study combined with strong retention techniques.",
};

pub const COORDINATOR_PERSONA: Persona = Persona {
    agent: "Coordinator",
    role: "Life Operations Coordinator",
    goal: "Validate the health, finance and study recommendations against each other, \
           resolve conflicts, and merge them into one coherent weekly plan.",
    background: "You coordinate busy people's lives and make sure no single area's advice \
                 undermines another.",
};

pub const REFLECTION_PERSONA: Persona = Persona {
    agent: "Reflection",
    role: "Progress Reflection Coach",
    goal: "Review the user's week, spot patterns, celebrate wins and suggest adjustments \
           for next week.",
    background: "You read weekly activity numbers and turn them into honest, encouraging \
                 feedback.",
};

// ── Orchestrated path: persona + task prompt ────────────────────────

pub fn health_task(inputs: &LifeInputs) -> String {
    format!(
        "Analyze the user's health situation.\n\n\
         User context:\n\
         - Stress level: {stress}/10\n\
         - Sleep: {sleep} hours per night\n\
         - Exercise frequency: {exercise}\n\
         - Problem: {problem}\n\n\
         Your analysis should include:\n\
         1. Current health risk assessment (Low/Medium/High)\n\
         2. Immediate stress reduction strategies\n\
         3. Sleep optimization plan\n\
         4. Exercise recommendations that fit current energy levels\n\
         5. Nutrition tips for stress management\n\
         6. Action items for the next 24 hours\n\n\
         Format the answer with clear sections. List each action item on its own line \
         starting with \"- \".",
        stress = inputs.stress_level,
        sleep = inputs.sleep_hours,
        exercise = inputs.exercise_frequency.label(),
        problem = inputs.problem,
    )
}

pub fn finance_task(inputs: &LifeInputs) -> String {
    format!(
        "Analyze the user's financial situation.\n\n\
         User context:\n\
         - Monthly budget: ${budget}\n\
         - Current expenses: ${expenses}\n\
         - Financial goals: {goals}\n\
         - Problem: {problem}\n\n\
         Your analysis should include:\n\
         1. Budget allocation with bill prioritization\n\
         2. Expense optimization opportunities\n\
         3. Savings strategy with a buffer for upcoming bills\n\
         4. Spending that supports health and study goals\n\
         5. Action items for financial tasks\n\n\
         Give specific, actionable advice. List each action item on its own line \
         starting with \"- \".",
        budget = inputs.monthly_budget,
        expenses = inputs.current_expenses,
        goals = inputs.financial_goals,
        problem = inputs.problem,
    )
}

pub fn study_task(inputs: &LifeInputs, today: NaiveDate) -> String {
    format!(
        "Analyze the user's study situation.\n\n\
         User context:\n\
         - Upcoming exam: {exam} ({days} days from now)\n\
         - Current study hours: {hours}/day\n\
         - Problem: {problem}\n\n\
         Your analysis should include:\n\
         1. A pomodoro schedule with adaptive breaks\n\
         2. Focus technique recommendations\n\
         3. Burnout prevention\n\
         4. A progress tracking routine\n\
         5. Action items for study sessions\n\n\
         Keep the plan realistic and sustainable. List each action item on its own line \
         starting with \"- \".",
        exam = inputs.exam_date_label(),
        days = inputs.days_until_exam(today),
        hours = inputs.current_study_hours,
        problem = inputs.problem,
    )
}

pub fn coordination_task(inputs: &LifeInputs, health: &str, finance: &str, study: &str) -> String {
    format!(
        "The user's primary problem: {problem}\n\n\
         Domain analyses to validate:\n\n\
         HEALTH ANALYSIS:\n{health}\n\n\
         FINANCE ANALYSIS:\n{finance}\n\n\
         STUDY ANALYSIS:\n{study}\n\n\
         Your coordination steps:\n\
         1. Validate each domain's recommendations for consistency and feasibility\n\
         2. Identify conflicts between them and decide trade-offs with reasons\n\
         3. Build one time-blocked weekly schedule\n\
         4. Produce an urgent/important priority matrix\n\
         5. List the key action items, one per line starting with \"- \"\n\n\
         Finish with a validation report as a fenced JSON block:\n\
         ```json\n\
         {{\"summary\": \"...\", \"health_approved\": \"...\", \"finance_approved\": \"...\", \
         \"study_approved\": \"...\", \"overall_score\": 0}}\n\
         ```",
        problem = inputs.problem,
    )
}

// ── Direct path: plain prompts, no persona ──────────────────────────

pub fn direct_health(inputs: &LifeInputs) -> String {
    format!(
        "As a health expert, analyze:\n\
         Stress: {}/10\n\
         Sleep: {} hours\n\
         Exercise: {}\n\
         Problem: {}\n\n\
         Provide specific, actionable health recommendations including:\n\
         1. Immediate stress reduction techniques\n\
         2. Sleep optimization tips\n\
         3. Exercise schedule based on current frequency\n\
         4. Nutrition advice\n\n\
         Format with clear sections and bullet points.",
        inputs.stress_level,
        inputs.sleep_hours,
        inputs.exercise_frequency.label(),
        inputs.problem,
    )
}

pub fn direct_finance(inputs: &LifeInputs) -> String {
    format!(
        "As a finance expert, analyze:\n\
         Budget: ${}\n\
         Expenses: ${}\n\
         Goals: {}\n\
         Problem: {}\n\n\
         Provide specific financial recommendations including:\n\
         1. Budget allocation strategy\n\
         2. Expense optimization\n\
         3. Savings plan\n\
         4. Bill management\n\n\
         Format with clear sections and bullet points.",
        inputs.monthly_budget, inputs.current_expenses, inputs.financial_goals, inputs.problem,
    )
}

pub fn direct_study(inputs: &LifeInputs, today: NaiveDate) -> String {
    format!(
        "As a study expert, analyze:\n\
         Exam in: {} days\n\
         Study hours: {}/day\n\
         Problem: {}\n\n\
         Provide specific study recommendations including:\n\
         1. Study schedule\n\
         2. Focus techniques\n\
         3. Break strategies\n\
         4. Exam preparation plan\n\n\
         Format with clear sections and bullet points.",
        inputs.days_until_exam(today),
        inputs.current_study_hours,
        inputs.problem,
    )
}

/// Integrated plan built locally when the coordinator is skipped.
///
/// Wellness gets 10% of the budget; study resources and the savings buffer
/// get 30% and 50% of the monthly surplus. Amounts are truncated to whole
/// dollars.
pub fn templated_coordination(inputs: &LifeInputs) -> String {
    let wellness = (inputs.monthly_budget * dec!(0.1)).trunc();
    let surplus = inputs.monthly_savings();
    let study_fund = (surplus * dec!(0.3)).trunc();
    let buffer = (surplus * dec!(0.5)).trunc();

    format!(
        "# Integrated Life Plan\n\n\
         ## Overview\n\
         Based on your input: \"{problem}\"\n\n\
         ## Health-Finance-Study Integration\n\
         1. **Morning Routine**: Start with 15-min meditation for stress management before study sessions\n\
         2. **Budget for Health**: Allocate ${wellness} monthly for health/wellness\n\
         3. **Study-Exercise Balance**: Alternate study blocks with short exercise breaks\n\
         4. **Financial Planning for Studies**: Set aside ${study_fund} for study resources\n\n\
         ## Weekly Schedule Template\n\
         - **Mon/Wed/Fri**: Study focus days with evening exercise\n\
         - **Tue/Thu**: Mixed days with financial review and light study\n\
         - **Weekends**: Recovery, planning, and creative work\n\n\
         ## Success Metrics\n\
         - Target stress reduction: {stress} → 5/10 within 2 weeks\n\
         - Study efficiency: Increase by 25% through focused sessions\n\
         - Financial buffer: Save ${buffer} this month",
        problem = inputs.problem,
        wellness = whole(wellness),
        study_fund = whole(study_fund),
        buffer = whole(buffer),
        stress = inputs.stress_level,
    )
}

/// Render a truncated amount without a trailing `.0`.
fn whole(amount: Decimal) -> Decimal {
    amount.normalize()
}

pub const DIRECT_INSIGHTS: &str = "Integrated analysis shows connections between stress \
management, budget allocation, and study efficiency. Key insight: Morning routines combining \
meditation and planning can improve all three domains simultaneously.";

// ── Default path: fixed texts ───────────────────────────────────────

pub const DEFAULT_HEALTH: &str = "## Health Analysis\n\n**Recommendations:**\n\
1. Practice 10-minute breathing exercises daily\n\
2. Aim for 7-8 hours of quality sleep\n\
3. Incorporate 30-minute walks 3 times a week\n\
4. Stay hydrated throughout the day";

pub const DEFAULT_FINANCE: &str = "## Finance Analysis\n\n**Recommendations:**\n\
1. Track all expenses for 7 days\n\
2. Create budget categories: essentials (50%), savings (20%), leisure (30%)\n\
3. Review subscriptions monthly\n\
4. Set up automatic savings transfer";

pub const DEFAULT_STUDY: &str = "## Study Analysis\n\n**Recommendations:**\n\
1. Use Pomodoro technique: 25min study, 5min break\n\
2. Create study schedule with specific topics per day\n\
3. Review material within 24 hours of learning\n\
4. Practice active recall with flashcards";

pub const DEFAULT_COORDINATION: &str = "## Integrated Life Plan\n\n\
Combine health, finance, and study by:\n\
1. Morning routine: 15min meditation + daily planning\n\
2. Schedule study sessions after exercise for better focus\n\
3. Weekly financial review on Sundays\n\
4. Sleep hygiene for better memory retention";

pub const DEFAULT_INSIGHTS: &str = "Basic integration patterns identified. For optimal \
results, implement consistent routines across all domains.";

// ── Weekly reflection ───────────────────────────────────────────────

pub fn reflection_task(data: &WeekData) -> String {
    format!(
        "Review the user's week.\n\n\
         Weekly data:\n{}\n\n\
         Your review should include:\n\
         1. Patterns in completed tasks\n\
         2. Consistency streak analysis\n\
         3. Health, finance and study balance\n\
         4. Improvement recommendations for next week\n\
         5. Achievements worth celebrating\n\n\
         Keep it data-driven and specific.",
        data.as_prompt_context()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> LifeInputs {
        LifeInputs {
            stress_level: 8,
            sleep_hours: 5,
            monthly_budget: dec!(2000),
            current_expenses: dec!(1800),
            problem: "Too much to do".into(),
            ..Default::default()
        }
    }

    #[test]
    fn preamble_carries_role_goal_background() {
        let p = HEALTH_PERSONA.preamble();
        assert!(p.starts_with("You are the Health and Wellness Officer."));
        assert!(p.contains("Goal: "));
        assert!(p.contains("Background: "));
    }

    #[test]
    fn task_prompts_interpolate_inputs() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let mut i = inputs();
        i.exam_date = NaiveDate::from_ymd_opt(2026, 5, 11);

        assert!(health_task(&i).contains("Stress level: 8/10"));
        assert!(finance_task(&i).contains("Monthly budget: $2000"));
        assert!(study_task(&i, today).contains("2026-05-11 (10 days from now)"));
        assert!(direct_study(&i, today).contains("Exam in: 10 days"));

        let coord = coordination_task(&i, "H-OUT", "F-OUT", "S-OUT");
        assert!(coord.contains("HEALTH ANALYSIS:\nH-OUT"));
        assert!(coord.contains("FINANCE ANALYSIS:\nF-OUT"));
        assert!(coord.contains("STUDY ANALYSIS:\nS-OUT"));
        assert!(coord.contains("\"overall_score\": 0"));
    }

    #[test]
    fn templated_plan_amounts_are_truncated() {
        let mut i = inputs();
        i.monthly_budget = dec!(2005);
        i.current_expenses = dec!(1800);
        let plan = templated_coordination(&i);
        // 10% of 2005 = 200.5 → 200; surplus 205 → 61.5 → 61 and 102.5 → 102
        assert!(plan.contains("Allocate $200 monthly"));
        assert!(plan.contains("Set aside $61 for study"));
        assert!(plan.contains("Save $102 this month"));
        assert!(plan.contains("Target stress reduction: 8 → 5/10"));
    }

    #[test]
    fn default_texts_have_headings() {
        assert!(DEFAULT_HEALTH.starts_with("## Health Analysis"));
        assert!(DEFAULT_FINANCE.starts_with("## Finance Analysis"));
        assert!(DEFAULT_STUDY.starts_with("## Study Analysis"));
        assert!(DEFAULT_COORDINATION.starts_with("## Integrated Life Plan"));
    }
}
