//! Packs color groups into draw programs for the logic processor.
//!
//! Two counters run per program. The flush counter tracks draw calls since the
//! display buffer was last flushed and forces a `drawflush` every
//! [`FLUSH_INTERVAL`] draws. The instruction counter tracks the program size
//! and starts a new program once it passes the configured budget.

use std::mem;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::grid::Color;
use crate::mapper::{Mapper, TargetRect};
use crate::scanner::ColorGroups;

/// Draw calls between forced buffer flushes.
pub const FLUSH_INTERVAL: usize = 250;
pub const DEFAULT_BUDGET: usize = 990;
pub const DEFAULT_DISPLAY: &str = "display1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackerConfig {
    /// Instructions allowed per program before it is closed.
    pub budget: usize,
    /// Display block the programs flush to.
    pub display: String,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            display: DEFAULT_DISPLAY.to_string(),
        }
    }
}

impl PackerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.budget == 0 {
            return Err(Error::InvalidBudget);
        }
        if self.display.is_empty() || self.display.chars().any(char::is_whitespace) {
            return Err(Error::InvalidDisplay(self.display.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    SetColor(Color),
    DrawRect(TargetRect),
    Flush,
}

impl Instruction {
    /// One program line, without the trailing newline.
    pub fn line(&self, display: &str) -> String {
        match self {
            Instruction::SetColor(c) => format!("draw color {} {} {} {} 0 0", c.r, c.g, c.b, c.a),
            Instruction::DrawRect(r) => format!("draw rect {} {} {} {} 0 0", r.x, r.y, r.w, r.h),
            Instruction::Flush => format!("drawflush {display}"),
        }
    }
}

/// One program's instructions plus its running counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
    buffered: usize,
    total: usize,
}

impl Program {
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Instruction count as charged against the budget.
    pub fn cost(&self) -> usize {
        self.total
    }

    /// Program text, one newline-terminated instruction per line.
    pub fn render(&self, display: &str) -> String {
        let mut out = String::new();
        for instruction in &self.instructions {
            out.push_str(&instruction.line(display));
            out.push('\n');
        }
        out
    }

    fn set_color(&mut self, color: Color) {
        self.instructions.push(Instruction::SetColor(color));
        self.total += 1;
    }

    fn draw(&mut self, rect: TargetRect) {
        self.instructions.push(Instruction::DrawRect(rect));
        self.buffered += 1;
        self.total += 1;
    }

    /// Flushes the buffer mid-program and restores the draw color.
    fn flush_and_recolor(&mut self, color: Color) {
        self.instructions.push(Instruction::Flush);
        self.instructions.push(Instruction::SetColor(color));
        self.buffered = 0;
        self.total += 2;
    }

    fn close(&mut self) {
        self.instructions.push(Instruction::Flush);
        self.buffered = 0;
    }
}

pub struct ScriptPacker<'a> {
    config: &'a PackerConfig,
    mapper: &'a Mapper,
    current: Program,
    finished: Vec<Program>,
    off_display: usize,
}

impl<'a> ScriptPacker<'a> {
    /// Rejects an invalid configuration before anything is packed.
    pub fn new(config: &'a PackerConfig, mapper: &'a Mapper) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            mapper,
            current: Program::default(),
            finished: Vec::new(),
            off_display: 0,
        })
    }

    /// Packs every group in first-seen color order. The last program is
    /// always closed with a flush, even when it is empty.
    pub fn pack(mut self, groups: &ColorGroups) -> Vec<Program> {
        for (color, rects) in groups.iter() {
            debug!("Packing {} rectangles of color {}.", rects.len(), color);
            self.current.set_color(color);
            for rect in rects {
                let target = self.mapper.map(rect);
                if !target.fits(self.mapper.resolution()) {
                    self.off_display += 1;
                }
                self.current.draw(target);

                if self.current.buffered >= FLUSH_INTERVAL {
                    self.current.flush_and_recolor(color);
                }
                if self.current.total > self.config.budget {
                    self.split(color);
                }
            }
        }

        if self.off_display > 0 {
            warn!(
                "{} rectangles extend past the {}px display ({} mode).",
                self.off_display,
                self.mapper.resolution(),
                self.mapper.mode()
            );
        }

        self.current.close();
        self.finished.push(self.current);
        self.finished
    }

    /// Closes the current program and opens the next one on `color`.
    fn split(&mut self, color: Color) {
        self.current.close();
        let done = mem::take(&mut self.current);
        debug!(
            "Program {} full at {} instructions.",
            self.finished.len(),
            done.total
        );
        self.finished.push(done);
        self.current.set_color(color);
    }
}

/// Packs `groups` and renders each program to text.
pub fn pack(groups: &ColorGroups, mapper: &Mapper, config: &PackerConfig) -> Result<Vec<String>> {
    let programs = ScriptPacker::new(config, mapper)?.pack(groups);
    Ok(programs
        .iter()
        .map(|program| program.render(&config.display))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::Mode;
    use crate::scanner::Rect;

    const RED: Color = Color::new(255, 0, 0, 255);
    const GREEN: Color = Color::new(0, 128, 0, 255);

    fn crop_mapper() -> Mapper {
        Mapper::new(Mode::Crop, 2000, 2000, 2000).unwrap()
    }

    fn single_color(color: Color, count: usize) -> ColorGroups {
        (0..count)
            .map(|i| (color, Rect::new(i % 1000, i / 1000, i % 1000, i / 1000)))
            .collect()
    }

    fn pack_programs(groups: &ColorGroups, budget: usize) -> Vec<Program> {
        let config = PackerConfig {
            budget,
            ..PackerConfig::default()
        };
        let mapper = crop_mapper();
        ScriptPacker::new(&config, &mapper).unwrap().pack(groups)
    }

    fn draws(program: &Program) -> usize {
        program
            .instructions()
            .iter()
            .filter(|i| matches!(i, Instruction::DrawRect(_)))
            .count()
    }

    #[test]
    fn renders_instruction_lines() {
        let groups: ColorGroups = [(GREEN, Rect::new(1, 2, 3, 4))].into_iter().collect();
        let mapper = crop_mapper();
        let texts = pack(&groups, &mapper, &PackerConfig::default()).unwrap();
        assert_eq!(
            texts,
            vec!["draw color 0 128 0 255 0 0\ndraw rect 1 2 3 3 0 0\ndrawflush display1\n".to_string()]
        );
    }

    #[test]
    fn custom_display_name() {
        let groups: ColorGroups = [(RED, Rect::new(0, 0, 0, 0))].into_iter().collect();
        let config = PackerConfig {
            display: "display3".into(),
            ..PackerConfig::default()
        };
        let texts = pack(&groups, &crop_mapper(), &config).unwrap();
        assert!(texts[0].ends_with("drawflush display3\n"));
    }

    #[test]
    fn budget_split_restates_color() {
        let programs = pack_programs(&single_color(RED, 1000), 990);
        assert_eq!(programs.len(), 2);
        assert_eq!(programs[1].instructions()[0], Instruction::SetColor(RED));
        assert_eq!(draws(&programs[0]) + draws(&programs[1]), 1000);
        assert!(programs[0].cost() > 990);
        assert!(programs[0].cost() <= 992);
    }

    #[test]
    fn flush_after_interval_reissues_color() {
        let programs = pack_programs(&single_color(RED, FLUSH_INTERVAL), 100_000);
        assert_eq!(programs.len(), 1);
        let ins = programs[0].instructions();
        // set color, 250 draws, flush, set color, final flush
        assert_eq!(ins.len(), FLUSH_INTERVAL + 4);
        assert!(matches!(ins[FLUSH_INTERVAL], Instruction::DrawRect(_)));
        assert_eq!(ins[FLUSH_INTERVAL + 1], Instruction::Flush);
        assert_eq!(ins[FLUSH_INTERVAL + 2], Instruction::SetColor(RED));
        assert_eq!(ins[FLUSH_INTERVAL + 3], Instruction::Flush);
        assert_eq!(programs[0].cost(), 1 + FLUSH_INTERVAL + 2);
    }

    #[test]
    fn no_flush_before_interval() {
        let programs = pack_programs(&single_color(RED, FLUSH_INTERVAL - 1), 100_000);
        let flushes = programs[0]
            .instructions()
            .iter()
            .filter(|i| **i == Instruction::Flush)
            .count();
        assert_eq!(flushes, 1);
    }

    #[test]
    fn every_program_ends_with_flush() {
        let mut groups = single_color(RED, 1300);
        for i in 0..700 {
            groups.push(GREEN, Rect::new(i, 1999, i, 1999));
        }
        let programs = pack_programs(&groups, 300);
        assert!(programs.len() > 1);
        for program in &programs {
            assert_eq!(program.instructions().last(), Some(&Instruction::Flush));
            assert!(matches!(program.instructions()[0], Instruction::SetColor(_)));
        }
        let total: usize = programs.iter().map(draws).sum();
        assert_eq!(total, 2000);
    }

    #[test]
    fn program_starts_with_current_color_across_groups() {
        // With a budget of 2 the second draw of each program pushes it over.
        let groups: ColorGroups = [
            (RED, Rect::new(0, 0, 0, 0)),
            (RED, Rect::new(1, 0, 1, 0)),
            (RED, Rect::new(2, 0, 2, 0)),
            (GREEN, Rect::new(3, 0, 3, 0)),
        ]
        .into_iter()
        .collect();
        let programs = pack_programs(&groups, 2);
        assert_eq!(programs.len(), 3);
        let second = programs[1].instructions();
        assert_eq!(second[0], Instruction::SetColor(RED));
        assert!(matches!(second[1], Instruction::DrawRect(r) if r.x == 2));
        assert_eq!(second[2], Instruction::SetColor(GREEN));
        assert_eq!(
            programs[2].instructions(),
            &[Instruction::SetColor(GREEN), Instruction::Flush]
        );
    }

    #[test]
    fn empty_groups_give_one_flushed_program() {
        let programs = pack_programs(&ColorGroups::new(), 990);
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0].instructions(), &[Instruction::Flush]);
    }

    #[test]
    fn zero_budget_is_rejected() {
        let config = PackerConfig {
            budget: 0,
            ..PackerConfig::default()
        };
        let mapper = crop_mapper();
        assert!(matches!(ScriptPacker::new(&config, &mapper), Err(Error::InvalidBudget)));
    }

    #[test]
    fn display_name_with_space_is_rejected() {
        let config = PackerConfig {
            display: "display 1".into(),
            ..PackerConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidDisplay(_))));
    }

    #[test]
    fn split_restarts_flush_interval() {
        let programs = pack_programs(&single_color(RED, 700), 300);
        let second = programs[1].instructions();
        let flushes: Vec<usize> = second
            .iter()
            .enumerate()
            .filter(|(_, i)| **i == Instruction::Flush)
            .map(|(at, _)| at)
            .collect();
        // set color, then 250 draws before the first mid-program flush
        assert_eq!(flushes, vec![FLUSH_INTERVAL + 1, 301]);
        assert_eq!(second.len(), 302);
        assert_eq!(draws(&programs[1]), 298);
        assert_eq!(programs[1].cost(), 301);
    }

    #[test]
    fn instruction_lines() {
        assert_eq!(Instruction::SetColor(RED).line("display1"), "draw color 255 0 0 255 0 0");
        assert_eq!(
            Instruction::DrawRect(TargetRect::new(4, 5, 6, 7)).line("display1"),
            "draw rect 4 5 6 7 0 0"
        );
        assert_eq!(Instruction::Flush.line("display2"), "drawflush display2");
    }

    #[test]
    fn budget_of_one_still_makes_progress() {
        let programs = pack_programs(&single_color(RED, 3), 1);
        assert_eq!(programs.len(), 4);
        assert_eq!(programs.iter().map(draws).sum::<usize>(), 3);
    }
}
