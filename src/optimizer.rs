use crate::options::OptimizerOptions;
use crate::renderer::{RendererCommand, RendererTypes};

/// Graphics state as last set by the stream, `None` when unknown.
#[derive(Debug)]
struct State<T: RendererTypes> {
    alpha: Option<T::Float>,
    fill: Option<T::Color>,
    stroke: Option<T::Color>,
    line_cap: Option<T::LineCap>,
    line_join: Option<T::LineJoin>,
    line_width: Option<T::Float>,
    miter_limit: Option<T::Float>,
    blend_mode: Option<T::BlendMode>,
}

impl<T: RendererTypes> Default for State<T> {
    fn default() -> Self {
        Self {
            alpha: None,
            fill: None,
            stroke: None,
            line_cap: None,
            line_join: None,
            line_width: None,
            miter_limit: None,
            blend_mode: None,
        }
    }
}

impl<T: RendererTypes> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            alpha: self.alpha.clone(),
            fill: self.fill.clone(),
            stroke: self.stroke.clone(),
            line_cap: self.line_cap.clone(),
            line_join: self.line_join.clone(),
            line_width: self.line_width.clone(),
            miter_limit: self.miter_limit.clone(),
            blend_mode: self.blend_mode.clone(),
        }
    }
}

/// Stores `value` in `slot` and reports whether it changed.
fn update<V: PartialEq + Clone>(slot: &mut Option<V>, value: &V) -> bool {
    if slot.as_ref() == Some(value) {
        return false;
    }
    *slot = Some(value.clone());
    true
}

/// Removes commands that cannot change the rendered output.
#[derive(Debug, Clone, Copy)]
pub struct CommandOptimizer {
    options: OptimizerOptions,
}

impl Default for CommandOptimizer {
    fn default() -> Self {
        Self::new(OptimizerOptions::default())
    }
}

impl CommandOptimizer {
    pub fn new(options: OptimizerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> OptimizerOptions {
        self.options
    }

    pub fn optimize<T: RendererTypes>(
        &self,
        commands: Vec<RendererCommand<T>>,
    ) -> Vec<RendererCommand<T>> {
        let mut commands = commands;
        if self.options.contains(OptimizerOptions::SKIP_INITIAL_SAVE_STATE) {
            commands = skip_initial_save_state(commands);
        }
        if self.options.contains(OptimizerOptions::SKIP_REDUNDANT_STATE) {
            commands = skip_redundant_state(commands);
        }
        commands
    }
}

/// Strips a save/restore pair that wraps the entire stream.
fn skip_initial_save_state<T: RendererTypes>(
    mut commands: Vec<RendererCommand<T>>,
) -> Vec<RendererCommand<T>> {
    let first_push = commands.iter().position(RendererCommand::is_push_state);
    let first_pop = commands.iter().position(RendererCommand::is_pop_state);
    match (first_push, first_pop) {
        (Some(0), Some(pop)) if pop + 1 == commands.len() => {
            commands.pop();
            commands.remove(0);
            commands
        }
        _ => commands,
    }
}

/// Drops set-commands whose value already holds in the current save scope.
fn skip_redundant_state<T: RendererTypes>(
    commands: Vec<RendererCommand<T>>,
) -> Vec<RendererCommand<T>> {
    let mut stack: Vec<State<T>> = vec![State::default()];
    let mut kept = Vec::with_capacity(commands.len());

    for command in commands {
        let keep = match &command {
            RendererCommand::PushState => {
                let top = stack.last().cloned().unwrap_or_default();
                stack.push(top);
                true
            }
            RendererCommand::PopState => {
                if stack.len() > 1 {
                    stack.pop();
                }
                true
            }
            other => match stack.last_mut() {
                Some(state) => apply(state, other),
                None => true,
            },
        };
        if keep {
            kept.push(command);
        }
    }
    kept
}

fn apply<T: RendererTypes>(state: &mut State<T>, command: &RendererCommand<T>) -> bool {
    match command {
        RendererCommand::SetAlpha(alpha) => update(&mut state.alpha, alpha),
        RendererCommand::SetFillColor(color) => update(&mut state.fill, color),
        RendererCommand::SetStrokeColor(color) => update(&mut state.stroke, color),
        RendererCommand::SetLineCap(cap) => update(&mut state.line_cap, cap),
        RendererCommand::SetLineJoin(join) => update(&mut state.line_join, join),
        RendererCommand::SetLineWidth(width) => update(&mut state.line_width, width),
        RendererCommand::SetLineMiterLimit(limit) => update(&mut state.miter_limit, limit),
        RendererCommand::SetBlendMode(mode) => update(&mut state.blend_mode, mode),
        // A pattern replaces the fill color.
        RendererCommand::SetFillPattern(_) => {
            state.fill = None;
            true
        }
        _ => true,
    }
}
