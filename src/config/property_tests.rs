//! Property-based tests for configuration module
//!
//! These tests use proptest to generate random configurations and verify
//! validation and TOML round-trips.

use super::*;
use proptest::prelude::*;

prop_compose! {
    fn valid_damage_config()(
        max_rects_per_output in 1usize..256,
        merge_on_drain in any::<bool>(),
    ) -> DamageConfig {
        DamageConfig {
            max_rects_per_output,
            merge_on_drain,
        }
    }
}

prop_compose! {
    fn valid_interaction_config()(
        min_width in 1u32..2048,
        min_height in 1u32..2048,
        focus_on_click in any::<bool>(),
    ) -> InteractionConfig {
        InteractionConfig {
            min_width,
            min_height,
            focus_on_click,
        }
    }
}

prop_compose! {
    fn valid_core_config()(
        damage in valid_damage_config(),
        notify_on_position_change in any::<bool>(),
        interaction in valid_interaction_config(),
        debug in any::<bool>(),
    ) -> CoreConfig {
        CoreConfig {
            damage,
            handshake: HandshakeConfig { notify_on_position_change },
            interaction,
            general: GeneralConfig { debug },
        }
    }
}

proptest! {
    /// Every generated configuration passes validation
    #[test]
    fn test_valid_configs_validate(config in valid_core_config()) {
        prop_assert!(config.validate().is_ok());
    }

    /// TOML serialization round-trip preserves every field
    #[test]
    fn test_config_toml_roundtrip(config in valid_core_config()) {
        let toml_str = toml::to_string(&config)?;
        let parsed: CoreConfig = toml::from_str(&toml_str)?;
        prop_assert_eq!(parsed, config);
    }

    /// A zero minimum size is always rejected, whatever else is set
    #[test]
    fn test_zero_min_size_rejected(mut config in valid_core_config(), zero_width in any::<bool>()) {
        if zero_width {
            config.interaction.min_width = 0;
        } else {
            config.interaction.min_height = 0;
        }
        prop_assert!(matches!(config.validate(), Err(CoreError::InvalidConfig(_))));
    }
}
