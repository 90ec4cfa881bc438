//! Agent stage definitions: roles, typed outputs, and prompts
//!
//! Each stage's response is parsed at this boundary into one variant of
//! `StageOutput`, so a malformed upstream response is caught at its
//! origin rather than deep in synthesis.

use crate::context::AgentContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One role in the four-stage reasoning chain, in fixed dependency order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Researcher,
    Analyst,
    Strategist,
    Drafter,
}

impl AgentRole {
    /// Fixed dependency order of the chain
    pub const ORDER: [AgentRole; 4] = [
        AgentRole::Researcher,
        AgentRole::Analyst,
        AgentRole::Strategist,
        AgentRole::Drafter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Researcher => "researcher",
            AgentRole::Analyst => "analyst",
            AgentRole::Strategist => "strategist",
            AgentRole::Drafter => "drafter",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "researcher" => Some(AgentRole::Researcher),
            "analyst" => Some(AgentRole::Analyst),
            "strategist" => Some(AgentRole::Strategist),
            "drafter" => Some(AgentRole::Drafter),
            _ => None,
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Researcher

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatuteRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sections: Vec<String>,
    #[serde(default)]
    pub application: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrecedentRef {
    #[serde(default)]
    pub citation: String,
    #[serde(default)]
    pub court: String,
    #[serde(default)]
    pub outcome: String,
    #[serde(default)]
    pub relevance: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProceduralRequirement {
    #[serde(default)]
    pub step: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchOutput {
    #[serde(default)]
    pub relevant_statutes: Vec<StatuteRef>,
    #[serde(default)]
    pub key_precedents: Vec<PrecedentRef>,
    #[serde(default)]
    pub procedural_requirements: Vec<ProceduralRequirement>,
    #[serde(default)]
    pub key_issues: Vec<String>,
    #[serde(default)]
    pub research_summary: String,
}

// ---------------------------------------------------------------------------
// Analyst

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrengthFactor {
    #[serde(default)]
    pub factor: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub evidence: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeaknessFactor {
    #[serde(default)]
    pub factor: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub mitigation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceAssessment {
    #[serde(default)]
    pub quality: String,
    #[serde(default)]
    pub gaps: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskFactor {
    #[serde(default)]
    pub risk: String,
    #[serde(default)]
    pub likelihood: String,
    #[serde(default)]
    pub impact: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutput {
    #[serde(default)]
    pub merit_score: Option<f64>,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub success_probability: Option<String>,
    #[serde(default)]
    pub strengths: Vec<StrengthFactor>,
    #[serde(default)]
    pub weaknesses: Vec<WeaknessFactor>,
    #[serde(default)]
    pub evidence_assessment: Option<EvidenceAssessment>,
    #[serde(default)]
    pub risk_factors: Vec<RiskFactor>,
    #[serde(default)]
    pub analysis_summary: String,
}

// ---------------------------------------------------------------------------
// Strategist

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryStrategy {
    #[serde(default)]
    pub approach: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub timeline: String,
    #[serde(default)]
    pub estimated_cost: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlternativeStrategy {
    #[serde(default)]
    pub approach: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub when: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionItem {
    #[serde(default)]
    pub step: u32,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub resources: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationStrategy {
    #[serde(default)]
    pub leverage: Vec<String>,
    #[serde(default)]
    pub targets: String,
    #[serde(default)]
    pub walk_away_point: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContingencyPlan {
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub response: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyOutput {
    #[serde(default)]
    pub primary_strategy: Option<PrimaryStrategy>,
    #[serde(default)]
    pub alternative_strategies: Vec<AlternativeStrategy>,
    #[serde(default)]
    pub action_plan: Vec<ActionItem>,
    #[serde(default)]
    pub negotiation_strategy: Option<NegotiationStrategy>,
    #[serde(default)]
    pub contingency_plans: Vec<ContingencyPlan>,
    #[serde(default)]
    pub strategy_summary: String,
}

// ---------------------------------------------------------------------------
// Drafter

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequiredDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub form: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutlineSection {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tips: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentOutline {
    #[serde(default)]
    pub document: String,
    #[serde(default)]
    pub sections: Vec<OutlineSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyArgument {
    #[serde(default)]
    pub argument: String,
    #[serde(default)]
    pub support: String,
    #[serde(default)]
    pub anticipated_response: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilingInstructions {
    #[serde(default, rename = "where")]
    pub location: String,
    #[serde(default, rename = "how")]
    pub method: String,
    #[serde(default)]
    pub fees: String,
    #[serde(default)]
    pub copies: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftingOutput {
    #[serde(default)]
    pub required_documents: Vec<RequiredDocument>,
    #[serde(default)]
    pub document_outlines: Vec<DocumentOutline>,
    #[serde(default)]
    pub key_arguments: Vec<KeyArgument>,
    #[serde(default)]
    pub filing_instructions: Option<FilingInstructions>,
    #[serde(default)]
    pub drafting_summary: String,
}

// ---------------------------------------------------------------------------
// Tagged union over the four stage outputs

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StageOutput {
    Research(ResearchOutput),
    Analysis(AnalysisOutput),
    Strategy(StrategyOutput),
    Drafting(DraftingOutput),
}

impl StageOutput {
    /// Parse a backend response into the variant for the given role.
    pub fn parse(role: AgentRole, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match role {
            AgentRole::Researcher => StageOutput::Research(serde_json::from_value(value)?),
            AgentRole::Analyst => StageOutput::Analysis(serde_json::from_value(value)?),
            AgentRole::Strategist => StageOutput::Strategy(serde_json::from_value(value)?),
            AgentRole::Drafter => StageOutput::Drafting(serde_json::from_value(value)?),
        })
    }

    pub fn role(&self) -> AgentRole {
        match self {
            StageOutput::Research(_) => AgentRole::Researcher,
            StageOutput::Analysis(_) => AgentRole::Analyst,
            StageOutput::Strategy(_) => AgentRole::Strategist,
            StageOutput::Drafting(_) => AgentRole::Drafter,
        }
    }

    pub fn summary(&self) -> &str {
        match self {
            StageOutput::Research(o) => &o.research_summary,
            StageOutput::Analysis(o) => &o.analysis_summary,
            StageOutput::Strategy(o) => &o.strategy_summary,
            StageOutput::Drafting(o) => &o.drafting_summary,
        }
    }
}

// ---------------------------------------------------------------------------
// Prompts

/// Stage system prompt, parameterized by case type and province
pub fn system_prompt(role: AgentRole, case_type: &str, province: &str) -> String {
    match role {
        AgentRole::Researcher => format!(
            "You are a legal research specialist for Canadian {case_type} cases in {province}.\n\
             Your role is to identify:\n\
             1. Relevant statutes and regulations\n\
             2. Key legal precedents\n\
             3. Similar case outcomes\n\
             4. Important deadlines and procedures\n\n\
             Always cite specific legislation and case law. Be thorough but focused."
        ),
        AgentRole::Analyst => format!(
            "You are a legal case analyst specializing in {case_type} cases in {province}.\n\
             Your role is to:\n\
             1. Assess case strength objectively\n\
             2. Evaluate evidence quality and gaps\n\
             3. Identify strengths and weaknesses\n\
             4. Calculate merit scores based on precedents\n\n\
             Be honest and realistic in your assessments."
        ),
        AgentRole::Strategist => format!(
            "You are a legal strategist for {case_type} cases in {province}.\n\
             Your role is to:\n\
             1. Develop winning legal strategies\n\
             2. Recommend the best pathway forward\n\
             3. Provide tactical advice\n\
             4. Suggest negotiation approaches\n\n\
             Focus on practical, actionable strategies."
        ),
        AgentRole::Drafter => format!(
            "You are a legal document drafter for {case_type} cases in {province}.\n\
             Your role is to:\n\
             1. Identify required forms and documents\n\
             2. Draft initial document outlines\n\
             3. Provide filing instructions\n\
             4. Suggest key arguments to include\n\n\
             Focus on practical document preparation guidance."
        ),
    }
}

fn evidence_block(ctx: &AgentContext) -> String {
    if ctx.evidence.is_empty() {
        "No evidence uploaded".to_string()
    } else {
        ctx.evidence
            .iter()
            .map(|e| {
                format!(
                    "- {}: {}",
                    e.name,
                    e.description.as_deref().unwrap_or("No description")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn pretty(value: &impl Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Stage user prompt. Each stage consumes the context plus only the
/// outputs of strictly earlier stages passed in by the orchestrator.
pub fn user_prompt(
    role: AgentRole,
    ctx: &AgentContext,
    research: Option<&ResearchOutput>,
    analysis: Option<&AnalysisOutput>,
    strategy: Option<&StrategyOutput>,
) -> String {
    let details = pretty(&ctx.details);

    match role {
        AgentRole::Researcher => format!(
            "Research relevant legal resources for this case:\n\n\
             CASE DETAILS:\n{details}\n\n\
             EVIDENCE AVAILABLE:\n{}\n\n\
             Return your research in this JSON format:\n\
             {{\n\
             \x20 \"relevantStatutes\": [\n\
             \x20   {{ \"name\": \"statute name\", \"sections\": [\"relevant sections\"], \"application\": \"how it applies\" }}\n\
             \x20 ],\n\
             \x20 \"keyPrecedents\": [\n\
             \x20   {{ \"citation\": \"case citation\", \"court\": \"court name\", \"outcome\": \"outcome\", \"relevance\": \"why relevant\" }}\n\
             \x20 ],\n\
             \x20 \"proceduralRequirements\": [\n\
             \x20   {{ \"step\": \"requirement\", \"deadline\": \"timeline if any\", \"source\": \"authority\" }}\n\
             \x20 ],\n\
             \x20 \"keyIssues\": [\"issue 1\", \"issue 2\"],\n\
             \x20 \"researchSummary\": \"brief summary of findings\"\n\
             }}",
            evidence_block(ctx),
        ),
        AgentRole::Analyst => format!(
            "Analyze this case based on the research provided:\n\n\
             CASE DETAILS:\n{details}\n\n\
             RESEARCH FINDINGS:\n{}\n\n\
             EVIDENCE:\n{}\n\n\
             EXISTING ANALYSIS (if any):\n{}\n\n\
             Return your analysis in this JSON format:\n\
             {{\n\
             \x20 \"meritScore\": <0-100>,\n\
             \x20 \"confidence\": \"<high/medium/low>\",\n\
             \x20 \"successProbability\": \"<percentage>\",\n\
             \x20 \"strengths\": [\n\
             \x20   {{ \"factor\": \"strength description\", \"impact\": \"high/medium/low\", \"evidence\": \"supporting evidence\" }}\n\
             \x20 ],\n\
             \x20 \"weaknesses\": [\n\
             \x20   {{ \"factor\": \"weakness description\", \"impact\": \"high/medium/low\", \"mitigation\": \"how to address\" }}\n\
             \x20 ],\n\
             \x20 \"evidenceAssessment\": {{\n\
             \x20   \"quality\": \"<strong/adequate/weak/missing>\",\n\
             \x20   \"gaps\": [\"gap 1\", \"gap 2\"],\n\
             \x20   \"recommendations\": [\"what evidence to gather\"]\n\
             \x20 }},\n\
             \x20 \"riskFactors\": [\n\
             \x20   {{ \"risk\": \"risk description\", \"likelihood\": \"high/medium/low\", \"impact\": \"description\" }}\n\
             \x20 ],\n\
             \x20 \"analysisSummary\": \"comprehensive summary\"\n\
             }}",
            research.map(pretty).unwrap_or_else(|| "None".to_string()),
            if ctx.evidence.is_empty() {
                "No evidence uploaded".to_string()
            } else {
                pretty(&ctx.evidence)
            },
            ctx.existing_analysis
                .as_ref()
                .map(pretty)
                .unwrap_or_else(|| "None".to_string()),
        ),
        AgentRole::Strategist => format!(
            "Develop a legal strategy based on this analysis:\n\n\
             CASE DETAILS:\n{details}\n\n\
             RESEARCH:\n{}\n\n\
             ANALYSIS:\n{}\n\n\
             Return your strategy in this JSON format:\n\
             {{\n\
             \x20 \"primaryStrategy\": {{\n\
             \x20   \"approach\": \"main strategy description\",\n\
             \x20   \"rationale\": \"why this approach\",\n\
             \x20   \"timeline\": \"expected timeline\",\n\
             \x20   \"estimatedCost\": \"cost range\"\n\
             \x20 }},\n\
             \x20 \"alternativeStrategies\": [\n\
             \x20   {{ \"approach\": \"alternative\", \"pros\": [\"pro1\"], \"cons\": [\"con1\"], \"when\": \"when to use\" }}\n\
             \x20 ],\n\
             \x20 \"actionPlan\": [\n\
             \x20   {{ \"step\": 1, \"action\": \"what to do\", \"deadline\": \"when\", \"priority\": \"high/medium/low\", \"resources\": \"what's needed\" }}\n\
             \x20 ],\n\
             \x20 \"negotiationStrategy\": {{\n\
             \x20   \"leverage\": [\"leverage points\"],\n\
             \x20   \"targets\": \"realistic settlement targets\",\n\
             \x20   \"walkAwayPoint\": \"when to litigate instead\"\n\
             \x20 }},\n\
             \x20 \"contingencyPlans\": [\n\
             \x20   {{ \"scenario\": \"if this happens\", \"response\": \"do this\" }}\n\
             \x20 ],\n\
             \x20 \"strategySummary\": \"executive summary of strategy\"\n\
             }}",
            research.map(pretty).unwrap_or_else(|| "None".to_string()),
            analysis.map(pretty).unwrap_or_else(|| "None".to_string()),
        ),
        AgentRole::Drafter => format!(
            "Provide document preparation guidance based on this strategy:\n\n\
             CASE DETAILS:\n{details}\n\n\
             STRATEGY:\n{}\n\n\
             Return your guidance in this JSON format:\n\
             {{\n\
             \x20 \"requiredDocuments\": [\n\
             \x20   {{ \"name\": \"document name\", \"form\": \"form number if applicable\", \"deadline\": \"filing deadline\", \"priority\": \"high/medium/low\", \"description\": \"what this document is for\" }}\n\
             \x20 ],\n\
             \x20 \"documentOutlines\": [\n\
             \x20   {{ \"document\": \"document name\", \"sections\": [ {{ \"heading\": \"section heading\", \"content\": \"what to include\", \"tips\": \"drafting tips\" }} ] }}\n\
             \x20 ],\n\
             \x20 \"keyArguments\": [\n\
             \x20   {{ \"argument\": \"legal argument\", \"support\": \"how to support it\", \"anticipatedResponse\": \"what other side might say\" }}\n\
             \x20 ],\n\
             \x20 \"filingInstructions\": {{\n\
             \x20   \"where\": \"where to file\",\n\
             \x20   \"how\": \"filing method\",\n\
             \x20   \"fees\": \"filing fees\",\n\
             \x20   \"copies\": \"number of copies needed\"\n\
             \x20 }},\n\
             \x20 \"draftingSummary\": \"summary of document preparation needs\"\n\
             }}",
            strategy.map(pretty).unwrap_or_else(|| "None".to_string()),
        ),
    }
}
