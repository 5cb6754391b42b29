//! The eighteen 5e skills and their governing abilities.

use serde::Serialize;

use crate::value_objects::{proficiency_bonus, Ability, AbilityScores};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkillDefinition {
    pub name: &'static str,
    pub ability: Ability,
    pub description: &'static str,
}

pub const SKILLS: &[SkillDefinition] = &[
    SkillDefinition {
        name: "Acrobatics",
        ability: Ability::Dexterity,
        description: "Stay on your feet in tricky situations, tumble, flip and balance.",
    },
    SkillDefinition {
        name: "Animal Handling",
        ability: Ability::Wisdom,
        description: "Calm, control or read the intentions of an animal.",
    },
    SkillDefinition {
        name: "Arcana",
        ability: Ability::Intelligence,
        description: "Recall lore about spells, magic items, planes and eldritch symbols.",
    },
    SkillDefinition {
        name: "Athletics",
        ability: Ability::Strength,
        description: "Climb, jump, swim and grapple.",
    },
    SkillDefinition {
        name: "Deception",
        ability: Ability::Charisma,
        description: "Convincingly hide the truth, verbally or through actions.",
    },
    SkillDefinition {
        name: "History",
        ability: Ability::Intelligence,
        description: "Recall lore about historical events, people, kingdoms and wars.",
    },
    SkillDefinition {
        name: "Insight",
        ability: Ability::Wisdom,
        description: "Determine the true intentions of a creature.",
    },
    SkillDefinition {
        name: "Intimidation",
        ability: Ability::Charisma,
        description: "Influence someone through overt threats or hostile actions.",
    },
    SkillDefinition {
        name: "Investigation",
        ability: Ability::Intelligence,
        description: "Look for clues and make deductions based on them.",
    },
    SkillDefinition {
        name: "Medicine",
        ability: Ability::Wisdom,
        description: "Stabilize a dying companion or diagnose an illness.",
    },
    SkillDefinition {
        name: "Nature",
        ability: Ability::Intelligence,
        description: "Recall lore about terrain, plants, animals and weather.",
    },
    SkillDefinition {
        name: "Perception",
        ability: Ability::Wisdom,
        description: "Spot, hear or otherwise detect the presence of something.",
    },
    SkillDefinition {
        name: "Performance",
        ability: Ability::Charisma,
        description: "Delight an audience with music, dance, acting or storytelling.",
    },
    SkillDefinition {
        name: "Persuasion",
        ability: Ability::Charisma,
        description: "Influence someone with tact, social graces or good nature.",
    },
    SkillDefinition {
        name: "Religion",
        ability: Ability::Intelligence,
        description: "Recall lore about deities, rites, prayers and religious hierarchies.",
    },
    SkillDefinition {
        name: "Sleight of Hand",
        ability: Ability::Dexterity,
        description: "Pick a pocket, plant something or perform manual trickery.",
    },
    SkillDefinition {
        name: "Stealth",
        ability: Ability::Dexterity,
        description: "Conceal yourself from enemies and slink past guards.",
    },
    SkillDefinition {
        name: "Survival",
        ability: Ability::Wisdom,
        description: "Follow tracks, hunt, guide a group and predict weather.",
    },
];

pub fn find_skill(name: &str) -> Option<&'static SkillDefinition> {
    let name = name.trim();
    SKILLS.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

/// Skill check bonus: ability modifier plus proficiency when proficient.
pub fn skill_bonus(skill: &SkillDefinition, scores: &AbilityScores, level: u8, proficient: bool) -> i32 {
    let base = scores.modifier(skill.ability);
    if proficient {
        base + proficiency_bonus(level)
    } else {
        base
    }
}
