use indexmap::IndexMap;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use petri_algebra::net::{
    CastAttributes, Column, Columns, Idx, Net, NetError, Rate, SpeciesId, TransitionId,
    TransitionSpec,
};
use petri_algebra::open::{CompositionError, OpenNet, Wiring, compose};
use petri_algebra::vectorfield::{EvaluatorKind, Parameters, compile};

fn random_net(rng: &mut StdRng) -> Net {
    let species = rng.random_range(1..=5usize);
    let transitions = rng.random_range(1..=4usize);
    let side = |rng: &mut StdRng| {
        let arity = rng.random_range(0..=3);
        (0..arity)
            .map(|_| rng.random_range(1..=species as u32))
            .collect::<Vec<_>>()
    };
    let specs = (0..transitions)
        .map(|_| {
            let inputs = side(rng);
            let outputs = side(rng);
            TransitionSpec::indices(inputs, outputs)
        })
        .collect::<Vec<_>>();
    Net::new(species, specs).unwrap()
}

fn random_reaction_net(rng: &mut StdRng, integer_rates: bool) -> Net {
    let net = random_net(rng);
    let rates = net
        .transitions()
        .map(|t| {
            let rate = if integer_rates {
                rng.random_range(1..=3) as f64
            } else {
                rng.random_range(0.05..2.0)
            };
            (t, Rate::Constant(rate))
        })
        .collect::<Vec<_>>();
    net.cast(
        Columns::REACTION,
        CastAttributes::new().rates(rates).default_concentration(1.0),
    )
    .unwrap()
}

fn sir() -> Net {
    Net::labelled_reaction(
        [("S", 10.0), ("I", 1.0), ("R", 0.0)],
        [
            (("inf", 0.4), TransitionSpec::new(["S", "I"], ["I", "I"])),
            (("rec", 0.4), TransitionSpec::new(["I"], ["R"])),
        ],
    )
    .unwrap()
}

/// Same incidence matrices under some relabeling of species and transitions.
fn isomorphic(a: &Net, b: &Net) -> bool {
    if a.matrices().shape() != b.matrices().shape() {
        return false;
    }
    let (ma, mb) = (a.matrices(), b.matrices());
    let (species, transitions) = (a.species_count(), a.transition_count());
    (0..species).permutations(species).any(|sp| {
        (0..transitions).permutations(transitions).any(|tp| {
            a.transitions().all(|t| {
                a.species().all(|s| {
                    let t2 = TransitionId::from_usize(tp[t.index()]);
                    let s2 = SpeciesId::from_usize(sp[s.index()]);
                    ma.input.get(t, s) == mb.input.get(t2, s2)
                        && ma.output.get(t, s) == mb.output.get(t2, s2)
                })
            })
        })
    })
}

#[test]
fn matrices_round_trip() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let net = random_net(&mut rng);
        let matrices = net.matrices();
        let rebuilt = Net::from_matrices(&matrices.input, &matrices.output).unwrap();
        assert_eq!(rebuilt.species_count(), net.species_count());
        assert_eq!(rebuilt.transition_count(), net.transition_count());
        assert_eq!(rebuilt.matrices(), matrices);
    }
}

fn leg_net(species: [&str; 2], transition: (&str, Vec<&str>, Vec<&str>)) -> OpenNet {
    let (name, inputs, outputs) = transition;
    let net = Net::labelled(species, [(name, TransitionSpec::new(inputs, outputs))]).unwrap();
    OpenNet::with_named_legs(net, species.map(|leg| [leg])).unwrap()
}

#[test]
fn composition_is_associative_up_to_isomorphism() {
    let a = leg_net(["S", "I"], ("inf", vec!["S", "I"], vec!["I", "I"]));
    let b = leg_net(["I", "R"], ("rec", vec!["I"], vec!["R"]));
    let c = leg_net(["R", "S"], ("wane", vec!["R"], vec!["S"]));

    let left = a.then(&b).unwrap().then(&c).unwrap();
    let right = a.then(&b.then(&c).unwrap()).unwrap();
    assert_eq!(left.apex().species_count(), 4);
    assert!(isomorphic(left.apex(), right.apex()));

    // Same gluing with the boxes listed in another order.
    let mut wiring = Wiring::new();
    wiring.add_junctions(["x", "y", "z", "w"]);
    wiring.add_box("c", &["z", "w"]).unwrap();
    wiring.add_box("b", &["y", "z"]).unwrap();
    wiring.add_box("a", &["x", "y"]).unwrap();
    wiring.set_outer_ports(&["x", "w"]).unwrap();
    let nets = IndexMap::from([
        ("a".to_owned(), a.clone()),
        ("b".to_owned(), b.clone()),
        ("c".to_owned(), c.clone()),
    ]);
    let flat = compose(&wiring, &nets).unwrap();
    assert_ne!(flat.apex().matrices(), left.apex().matrices());
    assert!(isomorphic(flat.apex(), left.apex()));
}

#[test]
fn identity_wiring_reproduces_the_net() {
    let mut rng = StdRng::seed_from_u64(11);
    let nets = (0..10).map(|_| random_net(&mut rng)).chain([sir()]);
    for net in nets {
        let open = OpenNet::new(net.clone());
        let mut wiring = Wiring::new();
        let ports = net.species().map(|s| s.to_string()).collect::<Vec<_>>();
        wiring.add_junctions(ports.iter().cloned());
        wiring.add_box("net", &ports).unwrap();
        wiring.set_outer_ports(&ports).unwrap();

        let boxes = IndexMap::from([("net".to_owned(), open.clone())]);
        let composite = compose(&wiring, &boxes).unwrap();
        assert_eq!(composite, open);
        assert_eq!(composite.apex(), &net);
    }
}

#[test]
fn sir_conserves_population() {
    let mut net = sir();
    let f = compile(&net, EvaluatorKind::Planned).unwrap();
    let du = f
        .derivative(&net.initial_state().unwrap(), &Parameters::new(), 0.0)
        .unwrap();
    assert_eq!(du, vec![-4.0, 3.6, 0.4]);

    net.set_rate(
        net.find_transition("inf").unwrap(),
        Rate::time_varying(|t| 0.4 + 0.1 * t.sin()),
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    for kind in [EvaluatorKind::Interpreted, EvaluatorKind::Planned] {
        let f = compile(&net, kind).unwrap();
        for _ in 0..20 {
            let u = (0..3)
                .map(|_| rng.random_range(0.0..100.0))
                .collect::<Vec<f64>>();
            let t = rng.random_range(0.0..50.0);
            let du = f.derivative(&u, &Parameters::new(), t).unwrap();
            let scale = du.iter().map(|d| d.abs()).fold(1.0, f64::max);
            assert!(du.iter().sum::<f64>().abs() <= 1e-12 * scale, "{du:?}");
        }
    }
}

#[test]
fn cast_keeps_structure_and_supplied_values() {
    let net = Net::new(
        3,
        [
            TransitionSpec::indices([1, 2], [2, 2]),
            TransitionSpec::indices([2], [3]),
        ],
    )
    .unwrap();
    let concentrations = [(SpeciesId::new(1), 5.0), (SpeciesId::new(2), 2.0), (SpeciesId::new(3), 0.5)];
    let rates = [
        (TransitionId::new(1), Rate::Constant(0.3)),
        (TransitionId::new(2), Rate::Constant(0.1)),
    ];
    let reaction = net
        .cast(
            Columns::REACTION,
            CastAttributes::new()
                .concentrations(concentrations)
                .rates(rates.clone()),
        )
        .unwrap();

    assert_eq!(reaction.species_count(), net.species_count());
    assert_eq!(reaction.transition_count(), net.transition_count());
    assert_eq!(reaction.input_count(), net.input_count());
    assert_eq!(reaction.output_count(), net.output_count());
    assert_eq!(reaction.matrices(), net.matrices());
    for (species, value) in concentrations {
        assert_eq!(reaction.concentration(species).unwrap(), value);
    }
    for (transition, rate) in &rates {
        assert_eq!(reaction.rate(*transition).unwrap(), rate);
    }
    assert_eq!(reaction.to_petri(), net);
}

#[test]
fn interpreted_and_planned_evaluators_agree() {
    let mut rng = StdRng::seed_from_u64(42);
    for round in 0..32 {
        let integer = round % 2 == 0;
        let net = random_reaction_net(&mut rng, integer);
        let interpreted = compile(&net, EvaluatorKind::Interpreted).unwrap();
        let planned = compile(&net, EvaluatorKind::Planned).unwrap();
        let u = net
            .species()
            .map(|_| {
                if integer {
                    rng.random_range(1..=9) as f64
                } else {
                    rng.random_range(0.1..10.0)
                }
            })
            .collect::<Vec<f64>>();
        let t = rng.random_range(0.0..10.0);
        let p = Parameters::new();
        let a = interpreted.derivative(&u, &p, t).unwrap();
        let b = planned.derivative(&u, &p, t).unwrap();
        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b), "round {round}");
    }
}

#[test]
fn errors_surface_to_the_caller() {
    let mut wiring = Wiring::new();
    wiring.add_junction("x");
    wiring.add_box("ghost", &["x"]).unwrap();
    assert!(matches!(
        compose(&wiring, &IndexMap::new()),
        Err(CompositionError::UnboundBox(name)) if name == "ghost"
    ));

    let plain = sir().to_petri();
    assert!(matches!(
        plain.cast(Columns::REACTION, CastAttributes::new().default_concentration(0.0)),
        Err(NetError::MissingAttribute { column: Column::Rate, .. })
    ));

    assert!(matches!(
        sir().find_species("V"),
        Err(NetError::UnknownName(name)) if name == "V"
    ));
}
