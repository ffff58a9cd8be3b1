use boss_arena_rendering::InputEvent;
use boss_arena_rendering_macroquad::PendingInput;
use glam::Vec2;

fn replay(presses: &[Option<InputEvent>]) -> Vec<Vec<InputEvent>> {
    let mut pending = PendingInput::default();
    let mut frames = Vec::new();
    for press in presses {
        if let Some(event) = press {
            pending.register(*event);
        }
        let mut drained = Vec::new();
        pending.take_into(&mut drained);
        frames.push(drained);
    }
    frames
}

#[test]
fn presses_are_delivered_to_exactly_one_frame() {
    let presses = [
        None,
        Some(InputEvent::LightAction),
        None,
        Some(InputEvent::ClickAt(Vec2::new(12.0, 40.0))),
        Some(InputEvent::HeavyAction),
    ];
    let frames = replay(&presses);

    assert_eq!(frames.len(), presses.len());
    assert!(frames[0].is_empty());
    assert_eq!(frames[1], vec![InputEvent::LightAction]);
    assert!(frames[2].is_empty());
    assert_eq!(frames[3], vec![InputEvent::ClickAt(Vec2::new(12.0, 40.0))]);
    assert_eq!(frames[4], vec![InputEvent::HeavyAction]);
    assert_eq!(replay(&presses), frames);
}

#[test]
fn presses_keep_their_order_until_taken() {
    let mut pending = PendingInput::default();
    pending.register(InputEvent::HeavyAction);
    pending.register(InputEvent::LightAction);
    assert_eq!(pending.len(), 2);

    let mut drained = Vec::new();
    pending.take_into(&mut drained);
    assert!(pending.is_empty());
    assert_eq!(drained, vec![InputEvent::HeavyAction, InputEvent::LightAction]);
}
