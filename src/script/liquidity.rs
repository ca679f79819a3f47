//! Bundled explainer: constant-product liquidity basics.
//!
//! A title, the `xy = k` invariant with a point swept along `y = 36/x`, four sections of
//! concentrated-liquidity formulas, and a closing line.

use crate::animation::ease::Ease;
use crate::foundation::core::{DOWN, LEFT, ORIGIN, RIGHT, UP};
use crate::foundation::ids::ElementId;
use crate::foundation::error::KinetexResult;
use crate::reactive::binding::Derived;
use crate::scene::element::{BLUE, YELLOW};
use crate::scene::payload::AxesPayload;
use crate::script::builder::SceneScript;
use crate::timeline::step::{AnimationStep, Emphasis};

/// Default artifact name for this scene.
pub const SCENE_NAME: &str = "uniswap_liquidity_basics";

const K: f64 = 36.0;

struct Section {
    heading: &'static str,
    formulas: &'static [&'static str],
    annotation: &'static str,
}

const SECTIONS: &[Section] = &[
    Section {
        heading: r"Price below range: $P \leq p_a$",
        formulas: &[
            r"x = L \left(\frac{\sqrt{p_b} - \sqrt{p_a}}{\sqrt{p_a}\sqrt{p_b}}\right)",
            r"L = x \frac{\sqrt{p_a}\sqrt{p_b}}{\sqrt{p_b} - \sqrt{p_a}}",
        ],
        annotation: "Position held entirely in token x",
    },
    Section {
        heading: r"Price above range: $P \geq p_b$",
        formulas: &[
            r"y = L \left(\sqrt{p_b} - \sqrt{p_a}\right)",
            r"L = \frac{y}{\sqrt{p_b} - \sqrt{p_a}}",
        ],
        annotation: "All value is in token y",
    },
    Section {
        heading: r"Price inside range: $p_a < P < p_b$",
        formulas: &[
            r"x = L \left(\frac{\sqrt{p_b} - \sqrt{P}}{\sqrt{P}\sqrt{p_b}}\right)",
            r"y = L \left(\sqrt{P} - \sqrt{p_a}\right)",
            r"\frac{x}{y} = \frac{\sqrt{p_b} - \sqrt{P}}{\sqrt{P} \left(\sqrt{P} - \sqrt{p_a}\right)}",
        ],
        annotation: "Liquidity splits between both tokens",
    },
    Section {
        heading: r"Recovering range bounds from $L, x, y$",
        formulas: &[
            r"\sqrt{p_a} = \sqrt{P} - \frac{y}{L}",
            r"\sqrt{p_b} = \frac{L \sqrt{P}}{L - x \sqrt{P}}",
        ],
        annotation: "Solve for ticks from observed reserves",
    },
];

/// Build the full script.
pub fn build() -> KinetexResult<SceneScript> {
    let mut s = SceneScript::new();

    let title = s.text("Uniswap v3 Liquidity Math Basics", 48.0)?;
    s.to_edge(title, UP, 0.5)?;
    s.play([AnimationStep::write(title)])?;
    s.wait(0.5)?;

    let caption = s.formula(r"\text{Constant product invariant } xy = k", 38.0)?;
    s.next_to(caption, title, DOWN, ORIGIN, 0.5)?;
    s.play([AnimationStep::fade_in_shifted(caption, DOWN * 0.3)])?;
    s.wait(0.3)?;

    curve_sweep(&mut s, caption)?;

    for section in SECTIONS {
        formula_section(&mut s, title, section)?;
    }

    let closing = s.text("Liquidity math keeps concentrated positions balanced.", 34.0)?;
    s.next_to(closing, title, DOWN, ORIGIN, 0.8)?;
    s.play([AnimationStep::fade_in_shifted(closing, UP * 0.3)])?;
    s.wait(2.0)?;
    Ok(s)
}

/// Axes with `y = K/x`, a dot driven along the curve and a live coordinate readout.
fn curve_sweep(s: &mut SceneScript, caption: ElementId) -> KinetexResult<()> {
    s.begin_block();
    let axes = s.axes(AxesPayload {
        x_range: [0.6, 10.0],
        y_range: [0.6, 10.0],
        x_step: 1.0,
        y_step: 1.0,
        x_length: 6.0,
        y_length: 4.0,
    })?;
    s.next_to(axes, caption, DOWN, ORIGIN, 0.6)?;
    let curve = s.plot(axes, |x| K / x, 0.8, 9.5)?;
    s.set_color(curve, BLUE)?;

    let tracker = s.value(2.2)?;
    let dot = s.marker(0.08)?;
    s.set_color(dot, YELLOW)?;
    let label = s.formula(r"x \approx 0.00,\quad y \approx 0.00", 30.0)?;

    s.play([AnimationStep::draw(axes)])?;
    s.play([AnimationStep::draw(curve)])?;

    s.bind(dot, &[tracker], move |input| {
        let x = input.value(0)?;
        Ok(Derived::at(input.scene.coords_to_point(axes, x, K / x)?))
    })?;
    let typesetter = s.typesetter();
    s.bind(label, &[tracker], move |input| {
        let x = input.value(0)?;
        let text = format!(r"x \approx {:.2},\quad y \approx {:.2}", x, K / x);
        let payload = typesetter.layout_formula(&text, 30.0)?;
        Ok(Derived::payload(payload).next_to(axes, RIGHT, ORIGIN, 0.5))
    })?;

    s.play([AnimationStep::fade_in(dot), AnimationStep::fade_in(label)])?;
    s.wait(0.4)?;
    s.play([AnimationStep::drive(tracker, 7.5)
        .duration(4.0)
        .ease(Ease::Linear)])?;
    s.wait(0.5)?;
    s.unbind(dot)?;
    let members = [axes, curve, dot, label, caption];
    s.play(members.into_iter().map(AnimationStep::fade_out))?;
    s.wait(0.4)?;
    s.end_block()
}

/// Heading, formulas linked by transform-matching, a brace with annotation, emphasis on the
/// last formula, then a clean exit.
fn formula_section(
    s: &mut SceneScript,
    title: ElementId,
    section: &Section,
) -> KinetexResult<()> {
    let heading = s.formula(section.heading, 36.0)?;
    s.next_to(heading, title, DOWN, ORIGIN, 0.8)?;
    s.play([AnimationStep::fade_in_shifted(heading, DOWN * 0.3)])?;
    s.wait(0.2)?;

    let mut formulas = Vec::with_capacity(section.formulas.len());
    for source in section.formulas {
        let formula = s.formula(source, 34.0)?;
        match formulas.last() {
            None => {
                s.next_to(formula, heading, DOWN, LEFT, 0.4)?;
                s.play([AnimationStep::write(formula)])?;
            }
            Some(&previous) => {
                s.next_to(formula, previous, DOWN, LEFT, 0.3)?;
                s.play([AnimationStep::transform_matching(previous, formula).retain_source()])?;
            }
        }
        s.wait(0.3)?;
        formulas.push(formula);
    }

    let content = s.group(&formulas)?;
    let brace = s.brace_for(content, LEFT, 0.2)?;
    let label = s.brace_label(brace, section.annotation, 28.0)?;
    s.align_to(label, brace, LEFT)?;

    s.play([AnimationStep::draw(brace)])?;
    s.play([AnimationStep::fade_in_shifted(label, RIGHT * 0.2)])?;
    if let Some(&last) = formulas.last() {
        s.play([AnimationStep::circumscribe(last).with_emphasis(Emphasis::Circumscribe {
            color: YELLOW,
            time_width: 1.2,
        })])?;
    }
    s.wait(0.6)?;

    let mut exit = vec![AnimationStep::fade_out(brace), AnimationStep::fade_out(label)];
    exit.push(AnimationStep::fade_out(heading));
    exit.extend(formulas.iter().copied().map(AnimationStep::fade_out));
    s.play(exit)?;
    s.wait(0.2)
}

#[cfg(test)]
#[path = "../../tests/unit/script/liquidity.rs"]
mod tests;
