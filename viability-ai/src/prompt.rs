use viability_core::ReportSnapshot;

const INSTRUCTIONS: &str = r#"Act as a Senior Independent NDIS Support Coordinator (Fail-Safe Specialist) with 15 years of experience in the Australian disability sector.

**Task:** Write a formal, holistic "Viability & Strategy Report" for a participant's file.

**Strict Style & Formatting Guidelines:**
1. **Format:** Return ONLY raw, valid HTML code. Do not use Markdown code blocks (like ```html).
2. **Styling:** Use Tailwind CSS classes for layout.
   - Use <table> with classes: "w-full border-collapse border border-slate-700 text-sm my-4".
   - Use <th> with classes: "border border-slate-700 bg-slate-800 p-2 text-left text-slate-200".
   - Use <td> with classes: "border border-slate-700 p-2 text-slate-300".
3. **Language:** Strict Professional Australian English (e.g., 'utilised', 'maximise', 'program', 'modelled').
4. **Tone:** Holistic, carefully worded, protective of the coordinator's liability, and strategically sharp. Avoid colloquialisms.

**Report Structure:**

<h3>1. Executive Summary</h3>
<p>[Provide a holistic summary of the current position. Is the funding sustainable? What is the primary risk?]</p>

<h3>2. Financial Trajectory Analysis</h3>
[Insert an HTML Table comparing the 'Current Status' vs 'Required for Sustainability']
- Columns: Metric, Current Value, Target/Safe Value, Variance.
- Metrics to include: Weekly Burn Rate, Projected End Date, Surplus/Shortfall.

<h3>3. Strategic Recommendations</h3>
[Provide 3-4 bullet points using <ul> and <li> tags. Focus on capacity building, safeguarding, and evidence collection for the next review.]"#;

/// The full prompt: fixed instructions followed by the case data.
pub fn build_prompt(snapshot: &ReportSnapshot) -> String {
    format!(
        "{INSTRUCTIONS}\n\n\
         **Case Data (as at {today}):**\n\
         - **Plan Context:** Plan ends on {end} ({weeks} weeks remaining).\n\
         - **Portal Truth:** Current Balance is {balance}.\n\
         - **Billing Model:** Currently billing {hours} hours/week ({cost}/week).\n\
         - **Projected Outcome:** {runway} weeks runway.\n\
         - **Gap Analysis:** The participant has a buffer of {buffer} weeks relative to the plan end date.\n\
         - **Financial Outcome:** Projected {outcome_label} of {outcome}.\n\
         - **System Verdict:** {status}\n\
         - **Immediate Advice:** {advice}\n\n\
         **Constraint:** Do not output any text outside the HTML tags. Start directly with the HTML content.",
        today = snapshot.today,
        end = snapshot.plan_end_date,
        weeks = snapshot.weeks_remaining,
        balance = snapshot.current_balance,
        hours = snapshot.hours_per_week,
        cost = snapshot.weekly_cost,
        runway = snapshot.runway_weeks,
        buffer = snapshot.buffer_weeks,
        outcome_label = snapshot.outcome_label,
        outcome = snapshot.outcome_amount,
        status = snapshot.status,
        advice = snapshot.advice_header,
    )
}
