//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    ports::{
        AdventureRepo, CampaignRepo, CharacterRepo, ClockPort, DiceRollRepo, LlmPort, RandomPort,
        SessionRepo, ToolkitRepo, TraceRepo,
    },
    sqlite::SqliteRepositories,
};
use crate::use_cases;

/// Main application state.
///
/// Holds all repositories and use cases.
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
    pub llm: Arc<dyn LlmPort>,
}

/// Container for all repository ports.
pub struct Repositories {
    pub character: Arc<dyn CharacterRepo>,
    pub campaign: Arc<dyn CampaignRepo>,
    pub session: Arc<dyn SessionRepo>,
    pub dice_roll: Arc<dyn DiceRollRepo>,
    pub toolkit: Arc<dyn ToolkitRepo>,
    pub trace: Arc<dyn TraceRepo>,
    pub adventure: Arc<dyn AdventureRepo>,
}

/// Container for all use cases.
pub struct UseCases {
    pub management: use_cases::ManagementUseCases,
    pub session: use_cases::SessionOps,
    pub dice: use_cases::DiceOps,
    pub toolkit: use_cases::ToolkitUseCases,
    pub trace: Arc<use_cases::TraceService>,
    pub adventure: use_cases::AdventureOps,
    pub narrate: use_cases::Narrate,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        repos: SqliteRepositories,
        llm: Arc<dyn LlmPort>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        let repositories = Repositories {
            character: repos.character,
            campaign: repos.campaign,
            session: repos.session,
            dice_roll: repos.dice_roll,
            toolkit: repos.toolkit,
            trace: repos.trace,
            adventure: repos.adventure,
        };

        // Shared by dice rolling and narration, which both append events
        let trace = Arc::new(use_cases::TraceService::new(
            repositories.trace.clone(),
            repositories.campaign.clone(),
            clock.clone(),
        ));

        let management = use_cases::ManagementUseCases::new(
            use_cases::management::CharacterCrud::new(
                repositories.character.clone(),
                repositories.campaign.clone(),
                clock.clone(),
            ),
            use_cases::management::CampaignCrud::new(repositories.campaign.clone(), clock.clone()),
        );

        let session = use_cases::SessionOps::new(
            repositories.session.clone(),
            repositories.campaign.clone(),
            clock.clone(),
        );

        let dice = use_cases::DiceOps::new(
            repositories.dice_roll.clone(),
            repositories.campaign.clone(),
            repositories.character.clone(),
            trace.clone(),
            random,
            clock.clone(),
        );

        let toolkit = use_cases::ToolkitUseCases::new(
            repositories.toolkit.clone(),
            repositories.campaign.clone(),
            clock.clone(),
        );

        let adventure = use_cases::AdventureOps::new(
            repositories.adventure.clone(),
            repositories.campaign.clone(),
        );

        let narrate = use_cases::Narrate::new(
            repositories.campaign.clone(),
            repositories.character.clone(),
            repositories.session.clone(),
            repositories.dice_roll.clone(),
            llm.clone(),
            trace.clone(),
            clock,
        );

        Self {
            repositories,
            use_cases: UseCases {
                management,
                session,
                dice,
                toolkit,
                trace,
                adventure,
                narrate,
            },
            llm,
        }
    }
}
