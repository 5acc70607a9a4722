//! Prompts for the Dungeon Master and for knowledge extraction
//!
//! Placeholders use `{name}` syntax and are filled by
//! [`PromptTemplate`](crate::template::PromptTemplate).

/// Entity extraction prompt
///
/// Placeholders: {history} - recent transcript, {input} - the new line
pub const ENTITY_EXTRACTION_PROMPT: &str = r#"You are reading the transcript of a tabletop role-playing session. Extract every proper noun from the last line of the conversation: characters, places, factions, items with names.

Use the history only to resolve what the last line refers to. Do not list entities that appear only in the history.

Return the entities as a single comma separated list. If there are none, return NONE.

EXAMPLE
Conversation history:
Player: I walk into the Adventurers Guild.
DM: Guild Girl waves at you from the counter.
Last line:
Player: I ask Guild Girl about the goblin quests near the Western Village.
Output: Guild Girl, Western Village
END OF EXAMPLE

EXAMPLE
Conversation history:
Player: Is it raining?
DM: A light drizzle falls over the road.
Last line:
Player: I keep walking.
Output: NONE
END OF EXAMPLE

Conversation history (for reference only):
{history}
Last line of conversation (for extraction):
Human: {input}

Output:"#;

/// Knowledge triple extraction prompt
///
/// Placeholders: {history} - recent transcript, {input} - the new line
pub const KNOWLEDGE_TRIPLE_EXTRACTION_PROMPT: &str = r#"You are building a knowledge graph for a tabletop role-playing campaign. Extract facts stated in the last line of the conversation as (subject, predicate, object) triples.

Only extract facts that are asserted, not questions or hypotheticals. Use the history to resolve pronouns into names, but do not extract facts that appear only in the history. Keep each field short and do not use commas inside a field.

Separate triples with <|>. If there are no facts, return NONE.

EXAMPLE
Conversation history:
Player: Who runs the inn?
DM: An old dwarf named Borin.
Last line:
Player: Borin is my uncle and he owes me ten gold.
Output: (Borin, is uncle of, Player)<|>(Borin, owes ten gold to, Player)
END OF EXAMPLE

EXAMPLE
Conversation history:
Player: Hello.
DM: Well met, traveller.
Last line:
Player: What time is it?
Output: NONE
END OF EXAMPLE

Conversation history (for reference only):
{history}
Last line of conversation (for extraction):
Human: {input}

Output:"#;

/// Dungeon Master prompt for a campaign in the world of "Goblin Slayer".
///
/// The returned template keeps the `{long_term_memory}`,
/// `{short_term_memory}` and `{input}` placeholders.
pub fn dungeon_master_prompt(player_nick: &str, dungeon_master: &str) -> String {
    format!(
        r#"The AI is Dungeon Master ({dungeon_master}) for the user's campaign. The campaign is set in the world of the "Goblin Slayer" anime.
{dungeon_master} prefers to use entity names instead of pronouns.
When {dungeon_master} creates a new non-player character, {dungeon_master} provides the character's name, full name, a detailed description and a summary of the character's personality.
When {dungeon_master} mentions a new location, {dungeon_master} provides the full location name, whether the place is part of a larger territorial unit, and a description of the location.

The AI takes into consideration additional information contained in the "Context" section.

Context:
{{long_term_memory}}

Conversation:
{{short_term_memory}}
{player_nick}: {{input}}
{dungeon_master}:"#
    )
}

/// Opening line the player "says" to register their character
pub fn introduction(character_name: &str, character_nick: &str) -> String {
    format!(
        "Good day to you, I want to create a new character. Full name of my character is '{character_name}'. Just '{character_nick}' for friends."
    )
}

/// Dungeon Master reply to [`introduction`]
pub fn introduction_reply(character_name: &str, character_nick: &str, dungeon_master: &str) -> String {
    format!(
        "Ok {character_nick}. Your new character is {character_name}. I will be your Dungeon Master ({dungeon_master})."
    )
}
