use ratatui::layout::{ Constraint, Layout, Rect };

/// Center `layout` vertically in `area` and split it
///
/// Returns one rect per constraint of `layout`.
pub fn vertically_centered_layout(area: Rect, layout: Layout) -> Vec<Rect> {
  let offset = get_height_of_layout(&layout).min(area.height);
  let padding = area.height.saturating_sub(offset) / 2;

  let [_, middle, _] = Layout::vertical([
    Constraint::Length(padding),
    Constraint::Length(offset),
    Constraint::Length(padding),
  ])
  .areas(area);

  layout.split(middle).to_vec()
}

fn get_height_of_layout(layout: &Layout) -> u16 {
  let dummy_rect = Rect::new(0, 0, 0, u16::MAX);
  let inner_sections = layout.split(dummy_rect);
  inner_sections.iter().map(|section| section.height).sum()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_centers_fixed_height_layout() {
    let area = Rect::new(0, 0, 40, 21);
    let layout = Layout::vertical([Constraint::Length(3), Constraint::Length(2)]);

    let sections = vertically_centered_layout(area, layout);

    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].y, 8);
    assert_eq!(sections[0].height, 3);
    assert_eq!(sections[1].y, 11);
    assert_eq!(sections[1].height, 2);
  }
}
