use crate::{
    error::Error,
    geometry::{self, Point},
    mode::DisplayMode,
    pose::{
        constants::{BACK_ANGLE_PARTS, CONFIDENCE_THRESHOLD, SKELETON_CONNECTIONS},
        KeypointKind, Pose,
    },
    surface::{Color, DrawingSurface, Font},
};
use tracing::trace;

/// Colors, sizes and thresholds used when drawing the overlay.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Style {
    /// Keypoints must score strictly above this to be drawn or measured.
    pub(crate) threshold: f32,
    pub(crate) marker_radius: u32,
    pub(crate) marker_color: Color,
    pub(crate) line_width: u32,
    pub(crate) bone_color: Color,
    pub(crate) shoulder_color: Color,
    pub(crate) center_line_color: Color,
    pub(crate) center_line_up: f32,
    pub(crate) center_line_down: f32,
    pub(crate) font: Font,
    pub(crate) text_anchor: (f32, f32),
    /// Back angles below this many degrees are drawn in `alert_color`.
    pub(crate) alert_angle: f32,
    pub(crate) alert_color: Color,
    pub(crate) normal_color: Color,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            threshold: CONFIDENCE_THRESHOLD,
            marker_radius: 5,
            marker_color: Color::RED,
            line_width: 2,
            bone_color: Color::GREEN,
            shoulder_color: Color::BLUE,
            center_line_color: Color::RED,
            center_line_up: 50.0,
            center_line_down: 200.0,
            font: Font { size_px: 24 },
            text_anchor: (10.0, 80.0),
            alert_angle: 160.0,
            alert_color: Color::RED,
            normal_color: Color::YELLOW,
        }
    }
}

/// What got drawn for one frame.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub(crate) struct RenderSummary {
    pub(crate) poses: usize,
    pub(crate) markers: usize,
    pub(crate) bones: usize,
    pub(crate) center_lines: usize,
    pub(crate) back_angles: usize,
}

#[derive(Debug, Default)]
pub(crate) struct OverlayRenderer {
    style: Style,
}

impl OverlayRenderer {
    pub(crate) fn new(style: Style) -> Self {
        Self { style }
    }

    /// Redraw the whole canvas: the video frame, then every pose on top of it.
    pub(crate) fn render<S>(
        &self,
        surface: &mut S,
        frame: &S::Image,
        poses: &[Pose],
        mode: DisplayMode,
    ) -> Result<RenderSummary, Error>
    where
        S: DrawingSurface,
    {
        let (width, height) = surface.size();
        surface.clear_rect(0, 0, width, height)?;
        surface.draw_image(frame, 0, 0, width, height)?;

        let mut summary = RenderSummary::default();
        for pose in poses {
            self.draw_pose(surface, pose, mode, &mut summary)?;
        }
        Ok(summary)
    }

    fn draw_pose<S>(
        &self,
        surface: &mut S,
        pose: &Pose,
        mode: DisplayMode,
        summary: &mut RenderSummary,
    ) -> Result<(), Error>
    where
        S: DrawingSurface,
    {
        let Style {
            threshold,
            marker_radius,
            marker_color,
            ..
        } = self.style;

        for keypoint in pose
            .keypoints()
            .filter(|keypoint| keypoint.is_confident(threshold))
        {
            surface.fill_circle(keypoint.point, marker_radius, marker_color)?;
            summary.markers += 1;
        }

        match mode {
            DisplayMode::CenterLine => {
                if self.draw_center_line(surface, pose)? {
                    summary.center_lines += 1;
                }
            }
            DisplayMode::BackAngle => {
                if self.draw_back_angle(surface, pose)?.is_some() {
                    summary.back_angles += 1;
                }
            }
        }

        summary.bones += self.draw_skeleton(surface, pose)?;
        summary.poses += 1;
        Ok(())
    }

    /// Shoulder line and its perpendicular through the midpoint. Returns whether
    /// the shoulder line was drawn.
    fn draw_center_line<S>(&self, surface: &mut S, pose: &Pose) -> Result<bool, Error>
    where
        S: DrawingSurface,
    {
        let style = &self.style;
        let (left, right) = match (
            pose.confident(KeypointKind::LeftShoulder, style.threshold),
            pose.confident(KeypointKind::RightShoulder, style.threshold),
        ) {
            (Some(left), Some(right)) => (left, right),
            _ => return Ok(false),
        };

        surface.stroke_line(left, right, style.line_width, style.shoulder_color)?;

        if !left.is_distinct(right) {
            trace!(message = "shoulders coincide, skipping center line", ?left);
            return Ok(true);
        }

        let (up, down) = geometry::perpendicular_segment(
            left,
            right,
            style.center_line_up,
            style.center_line_down,
        );
        surface.stroke_line(up, down, style.line_width, style.center_line_color)?;
        Ok(true)
    }

    /// Angle at the left hip between the left shoulder and left knee, drawn as
    /// text. All six torso and leg parts must be confident even though only
    /// the left side is measured.
    fn draw_back_angle<S>(&self, surface: &mut S, pose: &Pose) -> Result<Option<f32>, Error>
    where
        S: DrawingSurface,
    {
        let style = &self.style;
        if !BACK_ANGLE_PARTS
            .iter()
            .all(|&kind| pose.confident(kind, style.threshold).is_some())
        {
            return Ok(None);
        }

        let (shoulder, hip, knee) = match (
            pose.confident(KeypointKind::LeftShoulder, style.threshold),
            pose.confident(KeypointKind::LeftHip, style.threshold),
            pose.confident(KeypointKind::LeftKnee, style.threshold),
        ) {
            (Some(shoulder), Some(hip), Some(knee)) => (shoulder, hip, knee),
            _ => return Ok(None),
        };

        if !(hip.is_distinct(shoulder) && hip.is_distinct(knee)) {
            trace!(message = "degenerate hip angle, skipping", ?shoulder, ?hip, ?knee);
            return Ok(None);
        }

        let angle = geometry::joint_angle(shoulder, hip, knee);
        let color = if angle < style.alert_angle {
            style.alert_color
        } else {
            style.normal_color
        };
        let (x, y) = style.text_anchor;
        surface.fill_text(
            &format!("Back Angle: {}°", angle.round()),
            Point::new(x, y)?,
            style.font,
            color,
        )?;
        trace!(angle, alert = angle < style.alert_angle);
        Ok(Some(angle))
    }

    /// Lines between confident connected parts. Returns the number drawn.
    fn draw_skeleton<S>(&self, surface: &mut S, pose: &Pose) -> Result<usize, Error>
    where
        S: DrawingSurface,
    {
        let style = &self.style;
        let mut drawn = 0;
        for &(a, b) in SKELETON_CONNECTIONS.iter() {
            if let (Some(a_point), Some(b_point)) = (
                pose.confident(a, style.threshold),
                pose.confident(b, style.threshold),
            ) {
                surface.stroke_line(a_point, b_point, style.line_width, style.bone_color)?;
                drawn += 1;
            }
        }
        Ok(drawn)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{OverlayRenderer, RenderSummary};
    use crate::{
        camera::Blank,
        camera::FrameSource,
        mode::DisplayMode,
        pose::{tests::keypoint, KeypointKind, Pose},
        surface::{
            recording::{Op, Recording},
            Color,
        },
    };

    /// A standing person with every part confident.
    pub(crate) fn upright(score: f32) -> Pose {
        use crate::pose::KeypointKind::*;
        let parts = [
            (Nose, 320.0, 60.0),
            (LeftEye, 330.0, 50.0),
            (RightEye, 310.0, 50.0),
            (LeftEar, 340.0, 55.0),
            (RightEar, 300.0, 55.0),
            (LeftShoulder, 360.0, 120.0),
            (RightShoulder, 280.0, 120.0),
            (LeftElbow, 370.0, 180.0),
            (RightElbow, 270.0, 180.0),
            (LeftWrist, 375.0, 240.0),
            (RightWrist, 265.0, 240.0),
            (LeftHip, 350.0, 260.0),
            (RightHip, 290.0, 260.0),
            (LeftKnee, 352.0, 360.0),
            (RightKnee, 288.0, 360.0),
            (LeftAnkle, 354.0, 450.0),
            (RightAnkle, 286.0, 450.0),
        ];
        Pose::from_keypoints(
            parts
                .iter()
                .map(|&(kind, x, y)| keypoint(kind, x, y, score)),
            score,
        )
        .unwrap()
    }

    fn with(pose: Pose, kind: KeypointKind, x: f32, y: f32, score: f32) -> Pose {
        let mut keypoints: Vec<_> = pose
            .keypoints()
            .filter(|keypoint| keypoint.kind != kind)
            .copied()
            .collect();
        keypoints.push(keypoint(kind, x, y, score));
        Pose::from_keypoints(keypoints, pose.score).unwrap()
    }

    fn without(pose: &Pose, kind: KeypointKind) -> Pose {
        Pose::from_keypoints(
            pose.keypoints().filter(|k| k.kind != kind).copied(),
            pose.score,
        )
        .unwrap()
    }

    fn render(poses: &[Pose], mode: DisplayMode) -> (Recording, RenderSummary) {
        let mut surface = Recording::default();
        let mut source = Blank::new(640, 480);
        let summary = OverlayRenderer::default()
            .render(&mut surface, source.grab().unwrap(), poses, mode)
            .unwrap();
        (surface, summary)
    }

    #[test]
    fn base_image_is_drawn_first() {
        let (surface, summary) = render(&[], DisplayMode::CenterLine);
        assert_eq!(surface.ops, vec![Op::Clear, Op::Image]);
        assert_eq!(summary, RenderSummary::default());
    }

    #[test]
    fn full_pose_draws_every_marker_and_bone() {
        let (surface, summary) = render(&[upright(0.9)], DisplayMode::CenterLine);
        assert_eq!(summary.markers, 17);
        assert_eq!(summary.bones, 16);
        assert_eq!(summary.center_lines, 1);
        assert_eq!(
            surface.count(|op| matches!(op, Op::Circle { radius: 5, color: Color::RED, .. })),
            17
        );
        assert_eq!(
            surface.count(|op| matches!(op, Op::Line { color: Color::GREEN, .. })),
            16
        );
    }

    #[test]
    fn keypoint_at_threshold_is_not_drawn() {
        let pose = with(upright(0.9), KeypointKind::Nose, 320.0, 60.0, 0.5);
        let (_, summary) = render(&[pose], DisplayMode::CenterLine);
        assert_eq!(summary.markers, 16);
        // nose-leftEye and nose-rightEye
        assert_eq!(summary.bones, 14);
    }

    #[test]
    fn center_line_is_perpendicular_through_shoulder_midpoint() {
        let pose = with(upright(0.9), KeypointKind::LeftShoulder, 200.0, 120.0, 0.9);
        let pose = with(pose, KeypointKind::RightShoulder, 300.0, 120.0, 0.9);
        let (surface, _) = render(&[pose], DisplayMode::CenterLine);

        let shoulder = surface
            .ops
            .iter()
            .find(|op| matches!(op, Op::Line { color: Color::BLUE, .. }));
        assert!(shoulder.is_some());

        let perpendicular = surface
            .ops
            .iter()
            .find_map(|op| match op {
                Op::Line {
                    from,
                    to,
                    color: Color::RED,
                    width: 2,
                } => Some((*from, *to)),
                _ => None,
            })
            .unwrap();
        let (up, down) = perpendicular;
        assert!((up.x() - 250.0).abs() < 1e-3);
        assert!((down.x() - 250.0).abs() < 1e-3);
        assert!((up.y() - 170.0).abs() < 1e-3);
        assert!((down.y() - -80.0).abs() < 1e-3);
    }

    #[test]
    fn center_line_needs_both_shoulders() {
        let pose = without(&upright(0.9), KeypointKind::RightShoulder);
        let (surface, summary) = render(&[pose], DisplayMode::CenterLine);
        assert_eq!(summary.center_lines, 0);
        assert_eq!(
            surface.count(|op| matches!(op, Op::Line { color: Color::BLUE, .. })),
            0
        );
    }

    #[test]
    fn coincident_shoulders_skip_the_perpendicular() {
        let pose = with(upright(0.9), KeypointKind::RightShoulder, 360.0, 120.0, 0.9);
        let (surface, _) = render(&[pose], DisplayMode::CenterLine);
        assert_eq!(
            surface.count(|op| matches!(op, Op::Line { color: Color::BLUE, .. })),
            1
        );
        assert_eq!(
            surface.count(|op| matches!(op, Op::Line { color: Color::RED, .. })),
            0
        );
    }

    #[test]
    fn back_angle_text_once_per_confident_pose() {
        let (surface, summary) = render(&[upright(0.9), upright(0.8)], DisplayMode::BackAngle);
        assert_eq!(summary.back_angles, 2);
        assert_eq!(surface.texts().len(), 2);
        // no center line in this mode
        assert_eq!(
            surface.count(|op| matches!(op, Op::Line { color: Color::BLUE, .. })),
            0
        );
    }

    #[test]
    fn back_angle_skipped_when_any_part_is_missing_or_weak() {
        for &kind in crate::pose::constants::BACK_ANGLE_PARTS.iter() {
            let missing = without(&upright(0.9), kind);
            let (surface, _) = render(&[missing], DisplayMode::BackAngle);
            assert!(surface.texts().is_empty(), "{:?} missing", kind);

            let weak = upright(0.9);
            let point = weak.get(kind).unwrap().point;
            let weak = with(weak, kind, point.x(), point.y(), 0.5);
            let (surface, _) = render(&[weak], DisplayMode::BackAngle);
            assert!(surface.texts().is_empty(), "{:?} weak", kind);
        }
    }

    #[test]
    fn upright_back_is_not_flagged() {
        let (surface, _) = render(&[upright(0.9)], DisplayMode::BackAngle);
        let texts = surface.texts();
        assert_eq!(texts.len(), 1);
        let (text, color) = texts[0];
        assert!(text.starts_with("Back Angle: 17"), "{}", text);
        assert!(text.ends_with('°'));
        assert_eq!(color, Color::YELLOW);
    }

    #[test]
    fn bent_back_is_flagged() {
        // right angle at the left hip
        let pose = with(upright(0.9), KeypointKind::LeftKnee, 490.0, 270.0, 0.9);
        let (surface, _) = render(&[pose], DisplayMode::BackAngle);
        assert_eq!(surface.texts(), vec![("Back Angle: 90°", Color::RED)]);
    }

    /// Upright pose whose left shoulder, hip and knee meet at `degrees`.
    fn hip_angle(degrees: f32) -> Pose {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let pose = with(upright(0.9), KeypointKind::LeftShoulder, 350.0, 160.0, 0.9);
        with(
            pose,
            KeypointKind::LeftKnee,
            350.0 + 100.0 * sin,
            260.0 - 100.0 * cos,
            0.9,
        )
    }

    #[test]
    fn alert_uses_the_unrounded_angle() {
        let (surface, _) = render(&[hip_angle(159.6)], DisplayMode::BackAngle);
        assert_eq!(surface.texts(), vec![("Back Angle: 160°", Color::RED)]);

        let (surface, _) = render(&[hip_angle(160.4)], DisplayMode::BackAngle);
        assert_eq!(surface.texts(), vec![("Back Angle: 160°", Color::YELLOW)]);
    }

    #[test]
    fn repeated_parts_each_get_a_marker() {
        let mut keypoints: Vec<_> = upright(0.9).keypoints().copied().collect();
        keypoints.push(keypoint(KeypointKind::Nose, 400.0, 60.0, 0.9));
        let pose = Pose::from_keypoints(keypoints, 0.9).unwrap();

        let (surface, summary) = render(&[pose], DisplayMode::CenterLine);
        assert_eq!(summary.markers, 18);
        assert!(surface.ops.iter().any(|op| matches!(
            op,
            Op::Circle { center, .. } if center.x() == 400.0
        )));
        // bones still use the first nose
        assert_eq!(summary.bones, 16);
    }

    #[test]
    fn only_left_side_is_measured() {
        // a wildly bent right leg changes nothing
        let pose = with(upright(0.9), KeypointKind::RightKnee, 100.0, 260.0, 0.9);
        let (bent, _) = render(&[pose], DisplayMode::BackAngle);
        let (straight, _) = render(&[upright(0.9)], DisplayMode::BackAngle);
        assert_eq!(bent.texts(), straight.texts());
    }

    #[test]
    fn degenerate_hip_skips_text() {
        let pose = with(upright(0.9), KeypointKind::LeftKnee, 350.0, 260.0, 0.9);
        let (surface, _) = render(&[pose], DisplayMode::BackAngle);
        assert!(surface.texts().is_empty());
    }

    #[test]
    fn poses_render_independently() {
        let a = upright(0.9);
        let b = without(&upright(0.7), KeypointKind::LeftWrist);
        for &mode in [DisplayMode::CenterLine, DisplayMode::BackAngle].iter() {
            let (both, _) = render(&[a.clone(), b.clone()], mode);
            let (only_a, _) = render(&[a.clone()], mode);
            let (only_b, _) = render(&[b.clone()], mode);
            let mut expected = only_a.ops[2..].to_vec();
            expected.extend_from_slice(&only_b.ops[2..]);
            assert_eq!(both.ops[2..].to_vec(), expected);
        }
    }
}
