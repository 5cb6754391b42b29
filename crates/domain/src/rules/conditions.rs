use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConditionDefinition {
    pub name: &'static str,
    pub summary: &'static str,
}

pub const CONDITIONS: &[ConditionDefinition] = &[
    ConditionDefinition {
        name: "Blinded",
        summary: "Can't see. Attacks against it have advantage; its attacks have disadvantage.",
    },
    ConditionDefinition {
        name: "Charmed",
        summary: "Can't attack the charmer, who has advantage on social checks against it.",
    },
    ConditionDefinition {
        name: "Deafened",
        summary: "Can't hear and automatically fails checks that require hearing.",
    },
    ConditionDefinition {
        name: "Exhaustion",
        summary: "Cumulative levels of penalties, from disadvantage on checks up to death at level 6.",
    },
    ConditionDefinition {
        name: "Frightened",
        summary: "Disadvantage on checks and attacks while the source is in sight; can't move closer to it.",
    },
    ConditionDefinition {
        name: "Grappled",
        summary: "Speed becomes 0 until the grapple ends.",
    },
    ConditionDefinition {
        name: "Incapacitated",
        summary: "Can't take actions or reactions.",
    },
    ConditionDefinition {
        name: "Invisible",
        summary: "Can't be seen without special senses. Its attacks have advantage; attacks against it have disadvantage.",
    },
    ConditionDefinition {
        name: "Paralyzed",
        summary: "Incapacitated, can't move or speak. Melee hits against it are critical.",
    },
    ConditionDefinition {
        name: "Petrified",
        summary: "Turned to stone. Incapacitated and resistant to all damage.",
    },
    ConditionDefinition {
        name: "Poisoned",
        summary: "Disadvantage on attack rolls and ability checks.",
    },
    ConditionDefinition {
        name: "Prone",
        summary: "Can only crawl. Melee attacks against it have advantage, ranged attacks disadvantage.",
    },
    ConditionDefinition {
        name: "Restrained",
        summary: "Speed 0. Disadvantage on attacks and Dexterity saves; attacks against it have advantage.",
    },
    ConditionDefinition {
        name: "Stunned",
        summary: "Incapacitated, can't move, fails Strength and Dexterity saves.",
    },
    ConditionDefinition {
        name: "Unconscious",
        summary: "Incapacitated, drops what it holds and falls prone. Melee hits against it are critical.",
    },
];

pub fn find_condition(name: &str) -> Option<&'static ConditionDefinition> {
    let name = name.trim();
    CONDITIONS.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_standard_conditions() {
        assert_eq!(CONDITIONS.len(), 15);
        assert!(find_condition("prone").is_some());
        assert!(find_condition("Sleepy").is_none());
    }
}
