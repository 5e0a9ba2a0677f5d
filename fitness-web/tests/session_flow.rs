//! End-to-end sessions driven by synthetic pose frames

use fitness_web::counter::{FrameStatus, Stage, SuppressionPolicy};
use fitness_web::pose::{Hinge, Joint, Landmark, PoseFrame, Side, FLAT_XYZV_LEN};
use fitness_web::{CoachError, ExerciseKind, RepSession, SessionConfig};

const FRAME_DT: f64 = 1.0 / 30.0;

/// Limb hanging down: proximal joint above the vertex
const HANGING: (f32, f32) = (0.0, -0.2);
/// Limb raised: proximal joint below the vertex
const RAISED: (f32, f32) = (0.0, 0.2);

/// Place a hinge so the vertex angle is exactly `degrees`
fn place(
    frame: &mut PoseFrame,
    side: Side,
    hinge: Hinge,
    vertex: (f32, f32),
    proximal: (f32, f32),
    degrees: f32,
) {
    let [a, b, c] = hinge.joints(side);
    let (dx, dy) = proximal;
    let (sin, cos) = degrees.to_radians().sin_cos();
    frame.set(a, Landmark::at(vertex.0 + dx, vertex.1 + dy));
    frame.set(b, Landmark::at(vertex.0, vertex.1));
    frame.set(
        c,
        Landmark::at(vertex.0 + dx * cos - dy * sin, vertex.1 + dx * sin + dy * cos),
    );
}

fn legs(t: usize, left: f32, right: f32) -> PoseFrame {
    let mut frame = PoseFrame::empty(t as f64 * FRAME_DT);
    place(&mut frame, Side::Left, Hinge::Knee, (0.4, 0.7), HANGING, left);
    place(&mut frame, Side::Right, Hinge::Knee, (0.6, 0.7), HANGING, right);
    frame
}

fn arms(t: usize, proximal: (f32, f32), elbow_y: f32, left: f32, right: f32) -> PoseFrame {
    let mut frame = PoseFrame::empty(t as f64 * FRAME_DT);
    place(&mut frame, Side::Left, Hinge::Elbow, (0.4, elbow_y), proximal, left);
    place(&mut frame, Side::Right, Hinge::Elbow, (0.6, elbow_y), proximal, right);
    frame
}

fn flatten(frame: &PoseFrame) -> Vec<f32> {
    let mut data = vec![0.0; FLAT_XYZV_LEN];
    for joint in [
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
    ] {
        if let Some(lm) = frame.landmark(joint) {
            let base = joint.index() * 4;
            data[base..base + 4].copy_from_slice(&[lm.x, lm.y, lm.z, lm.visibility]);
        }
    }
    data
}

#[test]
fn squat_session_counts_and_coaches() {
    let mut session = RepSession::for_exercise(ExerciseKind::Squats);
    let angles = [170.0, 170.0, 100.0, 100.0, 170.0, 95.0];

    let reports: Vec<_> = angles
        .iter()
        .enumerate()
        .map(|(t, &a)| session.process(&legs(t, a, a)))
        .collect();

    let counted: Vec<u32> = reports
        .iter()
        .flat_map(|r| r.reps.iter().map(|rep| rep.count))
        .collect();
    assert_eq!(counted, vec![1, 2]);
    assert_eq!(reports[2].reps[0].cue, "Good squat!");

    let standing: Vec<&str> = reports[0].feedback().collect();
    assert_eq!(standing, vec!["Go lower for a full squat!"]);
    assert!(reports[2].feedback().any(|m| m == "Align knees with toes!"));
}

#[test]
fn squat_needs_both_knees() {
    let mut session = RepSession::for_exercise(ExerciseKind::Squats);
    session.process(&legs(0, 170.0, 170.0));
    session.process(&legs(1, 100.0, 170.0));
    assert_eq!(session.total(), 0);
    session.process(&legs(2, 100.0, 100.0));
    assert_eq!(session.total(), 1);
}

#[test]
fn lunges_count_each_side() {
    let mut session = RepSession::for_exercise(ExerciseKind::Lunges);
    let frames = [
        (170.0, 170.0),
        (100.0, 170.0),
        (170.0, 170.0),
        (170.0, 100.0),
        (170.0, 170.0),
        (100.0, 100.0),
    ];
    for (t, &(left, right)) in frames.iter().enumerate() {
        session.process(&legs(t, left, right));
    }
    // last frame bends both knees at once: one lunge
    assert_eq!(session.counts(), vec![2, 1]);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.limbs[0].label, "left");
    assert_eq!(snapshot.limbs[1].stage, Stage::Down);
    assert_eq!(snapshot.total, 3);
}

#[test]
fn lunge_with_both_knees_bent_counts_once() {
    let mut session = RepSession::for_exercise(ExerciseKind::Lunges);
    session.process(&legs(0, 170.0, 170.0));
    let bottom = session.process(&legs(1, 95.0, 100.0));
    assert_eq!(bottom.reps.len(), 1);
    assert_eq!(bottom.reps[0].cue, "Good left lunge!");
    assert_eq!(bottom.suppressed, vec!["right".to_string()]);

    session.process(&legs(2, 170.0, 170.0));
    assert_eq!(session.total(), 1);

    // back knee reaching depth a frame later is the same lunge
    session.process(&legs(3, 100.0, 150.0));
    session.process(&legs(4, 100.0, 100.0));
    session.process(&legs(5, 170.0, 170.0));
    assert_eq!(session.counts(), vec![2, 0]);
}

#[test]
fn overhead_press_only_counts_overhead() {
    let mut session = RepSession::for_exercise(ExerciseKind::OverheadPress);

    session.process(&arms(0, RAISED, 0.3, 170.0, 170.0));
    let report = session.process(&arms(1, RAISED, 0.3, 90.0, 90.0));
    assert_eq!(report.reps.len(), 1);
    assert_eq!(report.reps[0].cue, "Good overhead press!");

    // dumbbells lowered to the sides: stage resets
    let lowered = session.process(&arms(2, HANGING, 0.7, 170.0, 170.0));
    assert_eq!(lowered.status, FrameStatus::Gated);
    assert_eq!(session.stages(), vec![Stage::Unknown]);

    // back overhead but already bent: no rep until extended again
    session.process(&arms(3, RAISED, 0.3, 90.0, 90.0));
    assert_eq!(session.total(), 1);
    session.process(&arms(4, RAISED, 0.3, 170.0, 170.0));
    session.process(&arms(5, RAISED, 0.3, 90.0, 90.0));
    assert_eq!(session.total(), 2);
}

#[test]
fn curls_from_flat_buffers() {
    let mut session = RepSession::for_exercise(ExerciseKind::BicepCurl);
    let sequence = [(170.0, 170.0), (30.0, 30.0), (170.0, 170.0), (170.0, 30.0)];

    for (t, &(left, right)) in sequence.iter().enumerate() {
        let data = flatten(&arms(t, HANGING, 0.5, left, right));
        let frame = PoseFrame::from_flat(&data, t as f64 * FRAME_DT).unwrap();
        session.process(&frame);
    }
    // simultaneous curl counted once (left), later right-only curl counted
    assert_eq!(session.counts(), vec![1, 1]);
    assert_eq!(session.exercise().suppression, SuppressionPolicy::SuppressWhilePrimaryFlexed);
}

#[test]
fn lost_tracking_mid_rep() {
    let mut session = RepSession::for_exercise(ExerciseKind::Pushups);
    session.process(&arms(0, HANGING, 0.5, 170.0, 170.0));
    for t in 1..10 {
        let report = session.process(&PoseFrame::empty(t as f64 * FRAME_DT));
        assert_eq!(report.status, FrameStatus::Skipped);
        assert_eq!(report.into_feedback().count(), 0);
    }
    assert_eq!(session.stages(), vec![Stage::Up]);

    session.process(&arms(10, HANGING, 0.5, 80.0, 80.0));
    assert_eq!(session.total(), 1);
}

#[test]
fn custom_exercise_from_json() {
    let json = r#"{
        "exercise": {
            "name": "left curl",
            "limbs": [{
                "label": "left",
                "hinges": [{ "side": "left", "hinge": "elbow" }],
                "extended": 150.0,
                "flexed": 60.0,
                "extended_stage": "down",
                "cue": "Nice curl!"
            }]
        },
        "min_visibility": 0.3
    }"#;
    let config = SessionConfig::from_json(json).unwrap();
    let mut session = RepSession::new(config).unwrap();

    session.process(&arms(0, HANGING, 0.5, 155.0, 10.0));
    let report = session.process(&arms(1, HANGING, 0.5, 55.0, 10.0));
    assert_eq!(report.reps[0].cue, "Nice curl!");
    assert_eq!(session.counts(), vec![1]);
}

#[test]
fn unknown_exercise_name() {
    let err = "jumping jacks".parse::<ExerciseKind>().unwrap_err();
    assert!(matches!(err, CoachError::UnknownExercise(ref name) if name == "jumping jacks"));
    assert_eq!(err.to_string(), "unknown exercise: jumping jacks");
}
