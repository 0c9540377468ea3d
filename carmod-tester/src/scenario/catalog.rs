use anyhow::{Context, Result, ensure};
use carmod_game::upgrade::lerp;
use carmod_game::{Dispatch, LoadoutStore, NO_SELECTION, Rgba, StatAxis};

use super::{Scenario, ScenarioCtx};

const TOLERANCE: f32 = 1e-3;

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        key: "smoke",
        description: "Assemble the garage and route every request once",
        run: smoke,
    },
    Scenario {
        key: "engine-upgrades",
        description: "Three speed upgrades interpolate torque and persist level 3",
        run: engine_upgrades,
    },
    Scenario {
        key: "level-cap",
        description: "Brake upgrades stop at level 5 without further writes",
        run: level_cap,
    },
    Scenario {
        key: "wheel-swap",
        description: "Mount a catalog wheel, then restore stock wheels",
        run: wheel_swap,
    },
    Scenario {
        key: "exclusive-slots",
        description: "Spoiler and siren slots never show more than one variant",
        run: exclusive_slots,
    },
    Scenario {
        key: "paint-cascade",
        description: "Body paint reaches spoilers that follow the body colour",
        run: paint_cascade,
    },
    Scenario {
        key: "ceiling-heal",
        description: "Upgrade ceilings follow externally raised stats and never shrink",
        run: ceiling_heal,
    },
    Scenario {
        key: "retarget",
        description: "The facade follows the active vehicle",
        run: retarget,
    },
    Scenario {
        key: "no-target",
        description: "Requests with no active vehicle change nothing",
        run: no_target,
    },
    Scenario {
        key: "persistence",
        description: "Customizations are restored after a restart",
        run: persistence,
    },
];

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS
        .iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

#[must_use]
pub fn get_scenario(key: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|scenario| scenario.key == key)
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() <= TOLERANCE * b.abs().max(1.0)
}

fn smoke(ctx: &mut ScenarioCtx<'_>) -> Result<()> {
    let total = ctx.garage().vehicles().len();
    ensure!(total > 0, "garage is empty");
    ctx.step(format!("assembled {total} vehicle(s)"));

    let names = ctx.vehicles_with(|_| true);
    for name in names {
        ctx.select(&name)?;
        let facade = std::rc::Rc::clone(ctx.garage().facade());
        let outcomes = [
            facade.upgrade_speed()?,
            facade.upgrade_brake()?,
            facade.upgrade_handling()?,
            facade.change_wheels(NO_SELECTION)?,
            facade.spoiler(NO_SELECTION)?,
            facade.siren(NO_SELECTION)?,
            facade.paint(Rgba::WHITE)?,
        ];
        ensure!(
            !outcomes.contains(&Dispatch::NoTarget),
            "facade lost its target on '{name}'"
        );
        let snapshot = facade.snapshot().context("no snapshot for selected vehicle")?;
        ensure!(snapshot.vehicle == name, "snapshot is for '{}'", snapshot.vehicle);
        ctx.garage().tick();
    }
    Ok(())
}

fn engine_upgrades(ctx: &mut ScenarioCtx<'_>) -> Result<()> {
    let name = ctx.pick_vehicle("upgrades", |fitted| fitted.upgrades)?;
    let vehicle = ctx.select(&name)?;
    let facade = std::rc::Rc::clone(ctx.garage().facade());
    for _ in 0..3 {
        ensure!(
            facade.upgrade_speed()? == Dispatch::Applied,
            "speed upgrade was not applied"
        );
    }

    let (level, base, ceiling, torque) = {
        let applier = vehicle.borrow();
        let engine = applier
            .upgrade_manager()
            .context("upgrade manager disappeared")?
            .axis(StatAxis::Engine);
        (
            engine.level(),
            engine.base(),
            engine.ceiling(),
            applier.rig().engine_torque(),
        )
    };
    ctx.step(format!("engine level {level}, torque {torque:.1} ({base:.1}..{ceiling:.1})"));
    ensure!(level == 3, "expected engine level 3, got {level}");
    let expected = lerp(base, ceiling, 3.0 / 5.0);
    ensure!(
        close(torque, expected),
        "engine torque {torque} should be {expected}"
    );
    let persisted = ctx.persisted(&vehicle)?;
    ensure!(
        persisted.engine_level == 3,
        "persisted engine level is {}",
        persisted.engine_level
    );
    Ok(())
}

fn level_cap(ctx: &mut ScenarioCtx<'_>) -> Result<()> {
    let name = ctx.pick_vehicle("upgrades", |fitted| fitted.upgrades)?;
    let vehicle = ctx.select(&name)?;
    let facade = std::rc::Rc::clone(ctx.garage().facade());
    let mut applied = 0;
    for _ in 0..7 {
        if facade.upgrade_brake()? == Dispatch::Applied {
            applied += 1;
        }
    }
    ctx.step(format!("{applied} of 7 brake upgrades applied"));
    ensure!(applied == 5, "expected 5 applied brake upgrades, got {applied}");

    let (level, can_upgrade, ceiling, torque) = {
        let applier = vehicle.borrow();
        let brake = applier
            .upgrade_manager()
            .context("upgrade manager disappeared")?
            .axis(StatAxis::Brake);
        (
            brake.level(),
            brake.can_upgrade(),
            brake.ceiling(),
            applier.rig().brake_torque(),
        )
    };
    ensure!(level == 5, "brake level overflowed to {level}");
    ensure!(!can_upgrade, "level 5 still reports upgradeable");
    ensure!(
        close(torque, ceiling),
        "brake torque {torque} should equal ceiling {ceiling}"
    );
    ensure!(ctx.persisted(&vehicle)?.brake_level == 5, "level 5 was not persisted");
    Ok(())
}

fn wheel_swap(ctx: &mut ScenarioCtx<'_>) -> Result<()> {
    let name = ctx.pick_vehicle("wheels", |fitted| fitted.wheels)?;
    let count = ctx.assets().wheels().len();
    ensure!(count > 0, "wheel catalog is empty");
    let last = i32::try_from(count - 1).context("wheel catalog too large")?;
    let expected_id = ctx
        .assets()
        .wheels()
        .get(count - 1)
        .map(|wheel| wheel.id.clone())
        .context("catalog lost its last wheel")?;

    let vehicle = ctx.select(&name)?;
    let facade = std::rc::Rc::clone(ctx.garage().facade());
    facade.change_wheels(last)?;
    let mounted = vehicle.borrow().rig().mounted_wheel().map(str::to_string);
    ctx.step(format!("mounted {mounted:?}"));
    ensure!(
        mounted.as_deref() == Some(expected_id.as_str()),
        "expected '{expected_id}' mounted, got {mounted:?}"
    );

    facade.change_wheels(NO_SELECTION)?;
    ensure!(
        vehicle.borrow().rig().mounted_wheel().is_none(),
        "stock wheels were not restored"
    );
    ensure!(
        ctx.persisted(&vehicle)?.wheel == NO_SELECTION,
        "wheel index was not cleared"
    );

    let out_of_range = i32::try_from(count).context("wheel catalog too large")?;
    let err = facade
        .change_wheels(out_of_range)
        .err()
        .context("out-of-range wheel index was accepted")?;
    ensure!(err.is_invalid_argument(), "unexpected error: {err}");
    ctx.step(format!("rejected wheel {out_of_range}: {err}"));
    Ok(())
}

fn exclusive_slots(ctx: &mut ScenarioCtx<'_>) -> Result<()> {
    let spoilered = ctx.vehicles_with(|fitted| fitted.spoilers);
    let sirened = ctx.vehicles_with(|fitted| fitted.sirens);
    ensure!(
        !spoilered.is_empty() || !sirened.is_empty(),
        "garage has no spoilers or sirens to check"
    );

    for name in spoilered {
        let vehicle = ctx.select(&name)?;
        let facade = std::rc::Rc::clone(ctx.garage().facade());
        let count = vehicle
            .borrow()
            .spoiler_manager()
            .map_or(0, |manager| manager.spoilers().len());
        let count = i32::try_from(count).context("too many spoilers")?;
        for index in (0..count).chain([NO_SELECTION]) {
            facade.spoiler(index)?;
            let applier = vehicle.borrow();
            let spoilers = applier
                .spoiler_manager()
                .context("spoiler manager disappeared")?
                .spoilers();
            ensure!(
                spoilers.active_count() <= 1,
                "{} spoilers shown at once",
                spoilers.active_count()
            );
            ensure!(
                spoilers.active_index() == index,
                "spoiler {} shown after selecting {index}",
                spoilers.active_index()
            );
        }
        ctx.step(format!("cycled {count} spoiler(s) on '{name}'"));
    }

    for name in sirened {
        let vehicle = ctx.select(&name)?;
        let facade = std::rc::Rc::clone(ctx.garage().facade());
        let count = vehicle
            .borrow()
            .siren_manager()
            .map_or(0, |manager| manager.sirens().len());
        let count = i32::try_from(count).context("too many sirens")?;
        for index in (0..count).rev().chain([NO_SELECTION]) {
            facade.siren(index)?;
            let applier = vehicle.borrow();
            let sirens = applier
                .siren_manager()
                .context("siren manager disappeared")?
                .sirens();
            ensure!(sirens.active_count() <= 1, "several sirens shown at once");
            ensure!(
                sirens.active_index() == index,
                "siren {} shown after selecting {index}",
                sirens.active_index()
            );
        }
        ctx.step(format!("cycled {count} siren(s) on '{name}'"));
    }
    Ok(())
}

fn paint_cascade(ctx: &mut ScenarioCtx<'_>) -> Result<()> {
    let name = ctx.pick_vehicle("paint and spoilers", |fitted| {
        fitted.paint && fitted.spoilers
    })?;
    let vehicle = ctx.select(&name)?;
    let facade = std::rc::Rc::clone(ctx.garage().facade());

    let target = {
        let applier = vehicle.borrow();
        let manager = applier
            .spoiler_manager()
            .context("spoiler manager disappeared")?;
        ensure!(manager.paint_with_body(), "'{name}' spoilers do not follow paint");
        manager
            .spoilers()
            .iter()
            .enumerate()
            .find_map(|(position, spoiler)| {
                Some((position, spoiler.part.surface?, spoiler.part.material?))
            })
            .context("no paintable spoiler")?
    };
    let (position, surface, material) = target;
    facade.spoiler(i32::try_from(position).context("spoiler index too large")?)?;

    let color = Rgba::rgb(0.9, 0.35, 0.05);
    ensure!(
        facade.paint(color)? == Dispatch::Applied,
        "body paint was not applied"
    );
    let spoiler_color = vehicle.borrow().rig().material_color(surface, material);
    ctx.step(format!("spoiler colour after paint: {spoiler_color:?}"));
    ensure!(spoiler_color == Some(color), "spoiler kept {spoiler_color:?}");
    ensure!(ctx.persisted(&vehicle)?.paint == color, "paint was not persisted");
    Ok(())
}

fn ceiling_heal(ctx: &mut ScenarioCtx<'_>) -> Result<()> {
    let name = ctx.pick_vehicle("upgrades", |fitted| fitted.upgrades)?;
    let vehicle = ctx.select(&name)?;
    let engine_ceiling = |vehicle: &super::VehicleHandle| -> Result<f32> {
        Ok(vehicle
            .borrow()
            .upgrade_manager()
            .context("upgrade manager disappeared")?
            .axis(StatAxis::Engine)
            .ceiling())
    };

    let boosted = engine_ceiling(&vehicle)? + 250.0;
    vehicle.borrow_mut().rig_mut().set_engine_torque(boosted);
    ctx.garage().tick();
    let healed = engine_ceiling(&vehicle)?;
    ctx.step(format!("ceiling healed to {healed:.1}"));
    ensure!(close(healed, boosted), "ceiling {healed} did not follow {boosted}");

    vehicle.borrow_mut().rig_mut().set_engine_torque(0.0);
    ctx.garage().tick();
    let after_drop = engine_ceiling(&vehicle)?;
    ensure!(
        close(after_drop, boosted),
        "ceiling shrank to {after_drop}"
    );
    Ok(())
}

fn retarget(ctx: &mut ScenarioCtx<'_>) -> Result<()> {
    let names = ctx.vehicles_with(|fitted| fitted.upgrades);
    let [first, second, ..] = names.as_slice() else {
        anyhow::bail!("retarget needs two vehicles with upgrades");
    };

    let first_vehicle = ctx.select(first)?;
    let facade = std::rc::Rc::clone(ctx.garage().facade());
    facade.upgrade_handling()?;
    let second_vehicle = ctx.select(second)?;
    facade.upgrade_handling()?;
    facade.upgrade_handling()?;

    let first_level = ctx.persisted(&first_vehicle)?.handling_level;
    let second_level = ctx.persisted(&second_vehicle)?.handling_level;
    ctx.step(format!("handling levels: {first}={first_level}, {second}={second_level}"));
    ensure!(first_level == 1, "'{first}' handling level is {first_level}");
    ensure!(second_level == 2, "'{second}' handling level is {second_level}");

    let snapshot = facade.snapshot().context("facade has no target")?;
    ensure!(
        &snapshot.vehicle == second,
        "facade targets '{}'",
        snapshot.vehicle
    );
    Ok(())
}

fn no_target(ctx: &mut ScenarioCtx<'_>) -> Result<()> {
    ctx.garage_mut().deselect();
    let before: Vec<_> = ctx
        .garage()
        .vehicles()
        .iter()
        .map(|vehicle| vehicle.borrow().snapshot())
        .collect();

    let facade = std::rc::Rc::clone(ctx.garage().facade());
    let outcomes = [
        facade.paint(Rgba::BLACK)?,
        facade.change_wheels(0)?,
        facade.upgrade_speed()?,
        facade.upgrade_handling()?,
        facade.upgrade_brake()?,
        facade.spoiler(0)?,
        facade.siren(0)?,
    ];
    ensure!(
        outcomes.iter().all(|outcome| *outcome == Dispatch::NoTarget),
        "requests were routed without a target: {outcomes:?}"
    );
    ensure!(facade.snapshot().is_none(), "snapshot without a target");

    let after: Vec<_> = ctx
        .garage()
        .vehicles()
        .iter()
        .map(|vehicle| vehicle.borrow().snapshot())
        .collect();
    ensure!(before == after, "vehicle state changed without a target");
    for snapshot in &after {
        ensure!(
            !ctx.store().contains(&snapshot.save_key),
            "'{}' was written without a target",
            snapshot.save_key
        );
    }
    ctx.step("all seven requests ignored");
    Ok(())
}

fn persistence(ctx: &mut ScenarioCtx<'_>) -> Result<()> {
    let name = ctx.pick_vehicle("upgrades and wheels", |fitted| {
        fitted.upgrades && fitted.wheels
    })?;
    ensure!(!ctx.assets().wheels().is_empty(), "wheel catalog is empty");
    ctx.select(&name)?;
    let facade = std::rc::Rc::clone(ctx.garage().facade());
    facade.upgrade_speed()?;
    facade.upgrade_speed()?;
    facade.change_wheels(0)?;

    ctx.restart()?;
    let vehicle = ctx.vehicle(&name)?;
    let applier = vehicle.borrow();
    let loadout = applier.loadout();
    ensure!(loadout.engine_level == 2, "engine level {} after restart", loadout.engine_level);
    ensure!(loadout.wheel == 0, "wheel {} after restart", loadout.wheel);
    ensure!(
        applier.rig().mounted_wheel().is_some(),
        "saved wheel was not remounted"
    );
    let engine = applier
        .upgrade_manager()
        .context("upgrade manager disappeared")?
        .axis(StatAxis::Engine);
    ensure!(
        close(applier.rig().engine_torque(), engine.derived()),
        "engine torque was not re-derived"
    );
    Ok(())
}
