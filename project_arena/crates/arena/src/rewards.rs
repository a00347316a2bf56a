use net::{Host, Tone};
use space::registry::name_key;
use space::{RewardArea, TilePos};

use crate::error::ArenaError;
use crate::state::ArenaCore;

impl ArenaCore {
    pub fn add_reward_area(
        &mut self,
        name: &str,
        center: TilePos,
        radius: i32,
        reward: i64,
        cooldown_secs: i64,
    ) -> Result<(), ArenaError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ArenaError::InvalidArgument("reward area name must not be empty".into()));
        }
        if radius < 1 || reward < 0 || cooldown_secs < 0 {
            return Err(ArenaError::InvalidArgument(format!(
                "invalid reward area: radius {radius}, reward {reward}, cooldown {cooldown_secs}s"
            )));
        }
        let key = name_key(name);
        if self.reward_areas.iter().any(|a| name_key(&a.name) == key) {
            return Err(ArenaError::RewardAreaExists(name.to_string()));
        }

        let area = RewardArea::new(name, center, radius, reward, cooldown_secs);
        self.persist("reward area", |s| s.save_reward_area(&area));
        tracing::info!(area = %name, %center, radius, reward, cooldown_secs, "reward area added");
        self.reward_areas.push(area);
        Ok(())
    }

    /// Pay every online player standing in a reward area whose cooldown has
    /// run out. Returns the number of payouts.
    pub fn on_world_tick(&mut self, host: &mut dyn Host, now_ms: i64) -> usize {
        if self.reward_areas.is_empty() {
            return 0;
        }
        let positions: Vec<_> = host
            .online_players()
            .into_iter()
            .filter_map(|id| host.player(id).map(|p| (id, p.position)))
            .collect();

        let mut paid = 0;
        let mut touched = Vec::new();
        for (idx, area) in self.reward_areas.iter_mut().enumerate() {
            for &(player, pos) in &positions {
                if !area.is_due(player.0, pos, now_ms) {
                    continue;
                }
                area.record_payout(player.0, now_ms);
                host.message(
                    player,
                    Tone::Success,
                    &format!("You received {} coins for zone '{}'!", area.reward, area.name),
                );
                tracing::debug!(player = ?player, area = %area.name, reward = area.reward, "reward paid");
                paid += 1;
                if touched.last() != Some(&idx) {
                    touched.push(idx);
                }
            }
        }

        for idx in touched {
            if let Some(area) = self.reward_areas.get(idx) {
                self.persist("reward area", |s| s.save_reward_area(area));
            }
        }
        paid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{connect, core, drain, host};
    use net::HostCommand;
    use session::PlayerId;

    fn place(host: &mut net::ChannelHost, id: u16, x: i32, y: i32) {
        host.player_mut(PlayerId(id)).unwrap().position = TilePos::new(x, y);
    }

    #[test]
    fn add_reward_area_validates() {
        let mut core = core();
        core.add_reward_area("Pit", TilePos::new(0, 0), 5, 10, 60).unwrap();
        assert!(matches!(
            core.add_reward_area("pit", TilePos::new(9, 9), 5, 10, 60),
            Err(ArenaError::RewardAreaExists(_))
        ));
        for (radius, reward, cooldown) in [(0, 10, 60), (3, -1, 60), (3, 10, -5)] {
            assert!(matches!(
                core.add_reward_area("other", TilePos::default(), radius, reward, cooldown),
                Err(ArenaError::InvalidArgument(_))
            ));
        }
        assert_eq!(core.reward_areas().len(), 1);
    }

    #[test]
    fn pays_inside_radius_once_per_cooldown() {
        let mut core = core();
        core.add_reward_area("Pit", TilePos::new(0, 0), 5, 10, 60).unwrap();
        let (mut host, mut rx) = host();
        connect(&mut host, 1, "In");
        connect(&mut host, 2, "Edge");
        connect(&mut host, 3, "Out");
        place(&mut host, 1, 1, 1);
        place(&mut host, 2, 3, 4);
        // sqrt(50) truncates to 7.
        place(&mut host, 3, 5, 5);

        assert_eq!(core.on_world_tick(&mut host, 1_000), 2);
        let paid: Vec<_> = drain(&mut rx).into_iter().filter_map(|c| c.recipient()).collect();
        assert_eq!(paid, vec![PlayerId(1), PlayerId(2)]);

        assert_eq!(core.on_world_tick(&mut host, 60_999), 0);
        assert_eq!(core.on_world_tick(&mut host, 61_000), 2);
    }

    #[test]
    fn huge_cooldown_does_not_break_the_tick() {
        let mut core = core();
        core.add_reward_area("Pit", TilePos::new(0, 0), 5, 10, i64::MAX / 100)
            .unwrap();
        let (mut host, _rx) = host();
        connect(&mut host, 1, "A");

        assert_eq!(core.on_world_tick(&mut host, 1_000), 1);
        assert_eq!(core.on_world_tick(&mut host, 2_000), 0);
        assert_eq!(core.on_world_tick(&mut host, i64::MAX), 0);
    }

    #[test]
    fn payout_message_names_the_zone() {
        let mut core = core();
        core.add_reward_area("Pit", TilePos::new(0, 0), 5, 25, 0).unwrap();
        let (mut host, mut rx) = host();
        connect(&mut host, 1, "A");

        assert_eq!(core.on_world_tick(&mut host, 0), 1);
        match drain(&mut rx).as_slice() {
            [HostCommand::Message { text, .. }] => {
                assert_eq!(text, "You received 25 coins for zone 'Pit'!")
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
