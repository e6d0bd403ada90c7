//! Agent definitions for the text stages.

use crate::core::StageName;
use crate::model::ToolCapability;

/// What the Editor answers when the draft needs no changes.
pub const READY_TO_PUBLISH: &str = "The draft is great and ready to publish!";

/// Brand the Copywriter writes for.
pub const BRAND: &str = "Alura, the largest online technology school in Brazil";

/// Static definition of one text-generation agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSpec {
    /// Which stage this agent runs.
    pub stage: StageName,
    /// Agent name sent with logs.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Role instruction sent as the system instruction.
    pub instruction: &'static str,
    /// Tools the model may use.
    pub capability: ToolCapability,
}

/// Finds at most five recent, buzzing developments on the topic.
pub const NEWS_FINDER: AgentSpec = AgentSpec {
    stage: StageName::NewsFinder,
    name: "news_finder",
    description: "Searches the web for recent news about the given topic",
    instruction: "You are a research assistant. Use the web search tool to retrieve the \
latest, highly relevant launch news about the topic below. Focus on at most 5 relevant \
launches, ranked by how much news and enthusiasm there is about each one. If a theme has \
little news or little buzz, it is probably not that relevant and should be replaced by \
another one with more relevance. These launches must be current: no older than one month \
before today's date.",
    capability: ToolCapability::WebSearch,
};

/// Picks the single most relevant item and outlines the post.
pub const CONTENT_PLANNER: AgentSpec = AgentSpec {
    stage: StageName::ContentPlanner,
    name: "content_planner",
    description: "Plans social-media posts",
    instruction: "You are a content planner specialised in social media. Based on the list of \
the most recent and relevant launches from the researcher, use the web search tool to build \
a plan of the most relevant points a post about each of them could cover. You may also use \
web search to find more information about the themes and go deeper. At the end, choose the \
single most relevant theme among them based on your research and return that theme, its \
most relevant points, and an outline of the subjects the post will cover. Do not return a \
list of equally weighted options.",
    capability: ToolCapability::WebSearch,
};

/// Drafts the post in the brand voice.
pub const COPYWRITER: AgentSpec = AgentSpec {
    stage: StageName::Copywriter,
    name: "copywriter",
    description: "Writes engaging Instagram posts",
    instruction: "You are a creative copywriter specialised in viral social-media posts. You \
write posts for Alura, the largest online technology school in Brazil. Use the theme and \
the most relevant points from the post plan and, based on them, write a draft Instagram \
post about the given topic. The post must be engaging, informative, use simple language \
and end with 2 to 4 hashtags.",
    capability: ToolCapability::None,
};

/// Reviews the draft for an 18-30 audience.
pub const EDITOR: AgentSpec = AgentSpec {
    stage: StageName::Editor,
    name: "editor",
    description: "Reviews social-media posts",
    instruction: "You are a meticulous content editor specialised in Instagram posts. The \
audience is young, between 18 and 30 years old, so use a fitting tone. Review the Instagram \
post draft below about the given topic, checking clarity, concision, correctness and tone. \
If the draft is good, answer only 'The draft is great and ready to publish!'. If there are \
problems, rewrite the complete draft with the problems fixed and the improvements applied. \
Return the full rewritten post, not a list of changes.",
    capability: ToolCapability::None,
};

/// Describes an image that complements the final post.
pub const IMAGE_PROMPT_WRITER: AgentSpec = AgentSpec {
    stage: StageName::ImagePromptWriter,
    name: "image_prompt_writer",
    description: "Describes an image that complements the reviewed post",
    instruction: "You are a creative assistant specialised in visuals for social media. Based \
on the reviewed post, describe the ideal image to go with this Instagram post. The \
description must be clear and inspiring, focusing on concrete visual elements (subjects, \
setting, colours, composition) that best represent the theme and key points of the post. \
Keep it concise and focused on how the image relates to the content.",
    capability: ToolCapability::None,
};

/// Text agents in run order.
pub static TEXT_AGENTS: [AgentSpec; 5] = [
    NEWS_FINDER,
    CONTENT_PLANNER,
    COPYWRITER,
    EDITOR,
    IMAGE_PROMPT_WRITER,
];

/// Looks up the agent for a text stage.
#[must_use]
pub fn agent_for(stage: StageName) -> Option<&'static AgentSpec> {
    TEXT_AGENTS.iter().find(|a| a.stage == stage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_research_stages_search() {
        let searching: Vec<StageName> = TEXT_AGENTS
            .iter()
            .filter(|a| a.capability == ToolCapability::WebSearch)
            .map(|a| a.stage)
            .collect();
        assert_eq!(
            searching,
            vec![StageName::NewsFinder, StageName::ContentPlanner]
        );
    }

    #[test]
    fn test_agents_follow_run_order() {
        let order: Vec<StageName> = TEXT_AGENTS.iter().map(|a| a.stage).collect();
        assert_eq!(order, StageName::ALL[..5].to_vec());
    }

    #[test]
    fn test_editor_instruction_carries_sentinel() {
        assert!(EDITOR.instruction.contains(READY_TO_PUBLISH));
        assert!(COPYWRITER.instruction.contains(BRAND));
    }

    #[test]
    fn test_no_agent_for_image_stage() {
        assert!(agent_for(StageName::ImageGenerator).is_none());
        assert_eq!(agent_for(StageName::Editor).unwrap().name, "editor");
    }
}
